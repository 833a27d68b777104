//! Utility functions for the rating tool

/// Turn a snake_case key into a title-cased label ("fun_factor" -> "Fun Factor")
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a half-step rating for display ("7.0", "7.5")
pub fn format_rating(value: f64) -> String {
    format!("{:.1}", value)
}

/// Check whether two floating point values are equal within the given tolerance
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
