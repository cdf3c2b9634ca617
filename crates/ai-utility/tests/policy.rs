use ai_utility::{select_best, UtilityConfig};

#[test]
fn highest_score_wins_and_ties_go_to_the_earliest() {
    let config = UtilityConfig::default();
    assert_eq!(select_best([0.2, 0.9, 0.9, 0.1], &config), Some((1, 0.9)));
    assert_eq!(select_best([0.5], &config), Some((0, 0.5)));
}

#[test]
fn nan_never_wins() {
    let config = UtilityConfig::default();
    assert_eq!(select_best([f32::NAN, 0.3], &config), Some((1, 0.3)));
    assert_eq!(select_best([f32::NAN, f32::NAN], &config), None);
}

#[test]
fn options_below_min_score_are_not_selected() {
    let config = UtilityConfig {
        min_score: 0.5,
        ..UtilityConfig::default()
    };
    assert_eq!(select_best([0.1, 0.4], &config), None);
    assert_eq!(select_best([0.1, 0.5], &config), Some((1, 0.5)));
    assert_eq!(select_best(std::iter::empty(), &config), None);
}
