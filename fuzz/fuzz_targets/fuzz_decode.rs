#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding must either succeed or return an error, never panic
    let Ok(table) = structfeed::decode(data) else {
        return;
    };

    // Exercise the query layer on whatever structure came out
    for name in table.child_struct_names() {
        let sub = table.child_struct(&name);
        let _ = sub.child_names();
        let _ = sub.depth();
    }
    for name in table.child_data_names() {
        let _ = table.child_data(&name);
        let _ = table.child_matrix(&name, 3);
    }
    let _ = table.to_value();
    let _ = table.to_string();
});
