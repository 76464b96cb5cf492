//! HTML format tests
//!
//! Export (blocks → HTML), import (HTML → blocks) and the internal round trip.

mod custom_block;
mod export;
mod import;
mod roundtrip;
