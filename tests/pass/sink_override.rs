use std::sync::{Arc, LazyLock};

use addlogging::{MemorySink, SinkRef, addlogging};

static MEMORY: LazyLock<Arc<MemorySink>> = LazyLock::new(Default::default);

fn erased() -> SinkRef {
    MEMORY.clone()
}

#[addlogging(sink = MEMORY.clone())]
fn by_arc(x: u8) -> u8 {
    x
}

#[addlogging(sink = &*MEMORY)]
fn by_ref(x: u8) -> u8 {
    x
}

#[addlogging(sink = erased())]
fn by_erased(x: u8) -> u8 {
    x
}

#[addlogging(sink = addlogging::shared_sink(),)]
fn by_shared(x: u8) -> u8 {
    x
}

fn main() {
    by_arc(1);
    by_ref(2);
    by_erased(3);
    by_shared(4);
    assert_eq!(MEMORY.len(), 6);
}
