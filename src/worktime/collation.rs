use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use tracing::warn;

/// Ordering used for worker names in suggestion lists and exports.
pub trait NameOrder {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Plain code point order.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodePointOrder;

impl NameOrder for CodePointOrder {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }
}

/// Japanese collation backed by ICU data compiled into the binary.
pub struct JapaneseCollator {
    collator: Option<Collator>,
}

impl JapaneseCollator {
    pub fn new() -> Self {
        let collator = match Collator::try_new(&locale!("ja").into(), CollatorOptions::new()) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(error = %e, "Japanese collation unavailable, using code point order");
                None
            }
        };
        Self { collator }
    }
}

impl Default for JapaneseCollator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameOrder for JapaneseCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kana_sort_in_gojuon_order() {
        let collator = JapaneseCollator::new();
        let mut names = vec!["タナカ", "アオキ", "サトウ", "カトウ"];
        names.sort_by(|a, b| collator.compare(a, b));
        assert_eq!(names, vec!["アオキ", "カトウ", "サトウ", "タナカ"]);
    }

    #[test]
    fn hiragana_and_katakana_sort_together() {
        let collator = JapaneseCollator::new();
        // さとう (hiragana) sorts between カトウ and タナカ, not after all katakana
        let mut names = vec!["タナカ", "さとう", "カトウ"];
        names.sort_by(|a, b| collator.compare(a, b));
        assert_eq!(names, vec!["カトウ", "さとう", "タナカ"]);
    }

    #[test]
    fn code_point_order_is_byte_order() {
        assert_eq!(CodePointOrder.compare("b", "a"), Ordering::Greater);
        assert_eq!(CodePointOrder.compare("a", "a"), Ordering::Equal);
    }
}
