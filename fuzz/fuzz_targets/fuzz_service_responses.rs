#![no_main]

use libfuzzer_sys::fuzz_target;
use snaplabel::api::{parse_login_response, parse_search_response, parse_upload_response};
use snaplabel::workflow::LabelSet;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(generated) = parse_upload_response(body) {
        assert!(!generated.image_id.is_empty());

        let mut labels = LabelSet::new();
        labels.set_ai_labels(generated.labels.iter().cloned());
        assert_eq!(labels.final_labels(), generated.labels);
    }
    let _ = parse_login_response(body);
    let _ = parse_search_response(body);
});
