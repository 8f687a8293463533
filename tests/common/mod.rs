#![allow(dead_code)]

use gm_seedkey::{ProgramTable, ProgramTableBuilder};

/// A small table covering every opcode, plus an unknown opcode and the
/// rotate-by-16 edge case. Algorithms not listed run four identity steps.
pub fn sample_table() -> ProgramTable {
    ProgramTableBuilder::new()
        .programs([
            (0x01, [(0x14, 0x12, 0x34), (0x05, 0x00, 0x00), (0x2A, 0x01, 0x02), (0x4C, 0x03, 0x00)]),
            (0x02, [(0x37, 0x0F, 0xF0), (0x52, 0x01, 0x80), (0x6B, 0x00, 0x05), (0x75, 0xAB, 0xCD)]),
            (0x03, [(0x7E, 0x20, 0x10), (0x7E, 0x10, 0x20), (0x98, 0x11, 0x22), (0xF8, 0x33, 0x44)]),
            (0x10, [(0x2A, 0x05, 0x01), (0x99, 0xFF, 0xFF), (0x4C, 0x10, 0x00), (0x6B, 0x00, 0x00)]),
            (0xFF, [(0x6B, 0x00, 0x0C), (0x14, 0xFF, 0xFF), (0x05, 0x00, 0x00), (0x98, 0x00, 0x01)]),
        ])
        .build()
}

/// `(algo, seed, key)` triples for [`sample_table`].
pub const SAMPLE_VECTORS: &[(u8, u16, u16)] = &[
    (0x01, 0x0000, 0x5F76),
    (0x01, 0x1234, 0xBEE4),
    (0x01, 0xBEEF, 0xE17E),
    (0x01, 0xFFFF, 0x6776),
    (0x02, 0x0000, 0xD9AB),
    (0x02, 0x1234, 0xFA2B),
    (0x02, 0xBEEF, 0x4B2B),
    (0x02, 0xFFFF, 0x4D2B),
    (0x03, 0x0000, 0xDADB),
    (0x03, 0x1234, 0xED0F),
    (0x03, 0xBEEF, 0x98CA),
    (0x03, 0xFFFF, 0xD9DB),
    (0x10, 0x0000, 0xFFFF),
    (0x10, 0x1234, 0xEDCB),
    (0x10, 0xBEEF, 0x4110),
    (0x10, 0xFFFF, 0x0000),
    (0xFF, 0x0000, 0xFFFE),
    (0xFF, 0x1234, 0x4022),
    (0xFF, 0xBEEF, 0xFAED),
    (0xFF, 0xFFFF, 0xFEFE),
];
