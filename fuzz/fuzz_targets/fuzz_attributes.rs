#![no_main]

use libfuzzer_sys::fuzz_target;
use lmodal_widgets::modal::{ModalOptions, OptionsOverride};

fuzz_target!(|pairs: Vec<(String, String)>| {
    let attributes = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()));
    let strict = OptionsOverride::from_attributes(attributes.clone());
    let lenient = OptionsOverride::from_attributes_lenient(attributes);
    if let Ok(strict) = strict {
        assert_eq!(strict, lenient);
    }
    let _ = ModalOptions::default().layered(&lenient);
});
