#![no_main]

use libfuzzer_sys::fuzz_target;
use lmodal_widgets::modal::{Classification, Item, classify};

fuzz_target!(|locator: &str| {
    let classification = classify(&Item::new(locator));
    if locator.trim().starts_with('#') {
        assert!(matches!(classification, Classification::Inline { .. }));
    }
    let _ = classification.label();
});
