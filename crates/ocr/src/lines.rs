/// Normalize a recognized line for heuristic matching: uppercase fold
/// plus substitutions for artifacts the recognizer is known to
/// produce on printed labels (`|` read for `I`, `1D` read for `ID`).
///
/// Only trigger detection uses the result — the original text is what
/// gets stored into [`crate::LabelFields`] and reported back.
pub fn normalize_for_matching(text: &str) -> String {
    text.to_uppercase().replace('|', "I").replace("1D", "ID")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases() {
        assert_eq!(normalize_for_matching("Product Id: 7"), "PRODUCT ID: 7");
    }

    #[test]
    fn pipe_becomes_i() {
        assert_eq!(normalize_for_matching("P|D: 1804"), "PID: 1804");
    }

    #[test]
    fn digit_one_d_becomes_id() {
        assert_eq!(normalize_for_matching("Product 1D: 1804"), "PRODUCT ID: 1804");
    }

    #[test]
    fn clean_text_passes_through() {
        assert_eq!(normalize_for_matching("SKU: ELEC-552"), "SKU: ELEC-552");
    }

    #[test]
    fn is_deterministic_and_pure() {
        let s = "W|dget 1D 42";
        assert_eq!(normalize_for_matching(s), normalize_for_matching(s));
    }
}
