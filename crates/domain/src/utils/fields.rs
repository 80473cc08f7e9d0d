//! Pure string utilities for backend field names

/// Convert a snake_case backend field name into a human-readable label.
///
/// Underscores become spaces and each word is title-cased, so validation
/// errors can be prefixed with a readable field name.
///
/// # Examples
///
/// ```
/// use vitrine_domain::utils::field_label;
///
/// assert_eq!(field_label("email"), "Email");
/// assert_eq!(field_label("first_name"), "First Name");
/// ```
#[must_use]
pub fn field_label(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word_is_capitalized() {
        assert_eq!(field_label("email"), "Email");
    }

    #[test]
    fn underscores_become_spaces() {
        assert_eq!(field_label("first_name"), "First Name");
        assert_eq!(field_label("shipping_address_line_1"), "Shipping Address Line 1");
    }

    #[test]
    fn already_capitalized_input_is_preserved() {
        assert_eq!(field_label("Email"), "Email");
    }

    #[test]
    fn consecutive_underscores_do_not_produce_empty_words() {
        assert_eq!(field_label("billing__city"), "Billing City");
        assert_eq!(field_label("_leading"), "Leading");
    }

    #[test]
    fn empty_input_yields_empty_label() {
        assert_eq!(field_label(""), "");
    }
}
