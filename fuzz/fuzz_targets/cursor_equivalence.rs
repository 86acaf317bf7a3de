#![no_main]

use avltree::model::CursorEquivalenceInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: CursorEquivalenceInput| {
    avltree::model::run_cursor_equivalence(input.values, input.ops);
});
