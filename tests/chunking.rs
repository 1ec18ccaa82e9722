//! Incremental-decode equivalence
//!
//! The decoder must produce the same final grid whether a byte stream
//! arrives in one call or split at any boundaries. The property test
//! generates scripts mixing text, control characters and escape
//! sequences, splits them at random points and compares snapshots.

use proptest::prelude::*;

use dango_terminal::core::Snapshot;
use dango_terminal::Terminal;

const ROWS: usize = 8;
const COLS: usize = 20;

fn snapshot_of(chunks: &[&[u8]]) -> Snapshot {
    let mut term = Terminal::new(ROWS, COLS);
    for chunk in chunks {
        term.process(chunk);
    }
    term.snapshot()
}

fn feed_split(script: &[u8], splits: &[usize]) -> Snapshot {
    let mut term = Terminal::new(ROWS, COLS);
    let mut start = 0;
    for &split in splits {
        let split = split.min(script.len());
        if split > start {
            term.process(&script[start..split]);
            start = split;
        }
    }
    term.process(&script[start..]);
    term.snapshot()
}

/// Script fragments that exercise every decoder state
fn fragment() -> impl Strategy<Value = Vec<u8>> {
    // Fixed fragments: multi-byte scalars, control characters, complete
    // style/save/restore sequences, OSC noise with both terminators, and
    // bytes the grammar rejects
    let fixed = prop::sample::select(vec![
        "é".as_bytes().to_vec(),
        "中".as_bytes().to_vec(),
        "😀".as_bytes().to_vec(),
        b"\r\n".to_vec(),
        b"\x08".to_vec(),
        b"\t".to_vec(),
        b"\x07".to_vec(),
        b"\x1b[0m".to_vec(),
        b"\x1b[1m".to_vec(),
        b"\x1b[s".to_vec(),
        b"\x1b[u".to_vec(),
        b"\x1b]0;title\x07".to_vec(),
        b"\x1b]2;other\x1b\\".to_vec(),
        b"\xFF".to_vec(),
        b"\x1bM".to_vec(),
        b"\x1b[?25l".to_vec(),
    ]);

    prop_oneof![
        // Plain ASCII runs
        3 => "[ -~]{1,12}".prop_map(|s| s.into_bytes()),
        4 => fixed,
        // Cursor motion and erase with generated parameters
        1 => (1u16..30, 1u16..30).prop_map(|(r, c)| format!("\x1b[{};{}H", r, c).into_bytes()),
        1 => (0u16..5).prop_map(|n| format!("\x1b[{}A", n).into_bytes()),
        1 => (0u16..5).prop_map(|n| format!("\x1b[{}C", n).into_bytes()),
        1 => (0u16..3).prop_map(|m| format!("\x1b[{}J", m).into_bytes()),
        1 => (0u16..3).prop_map(|m| format!("\x1b[{}K", m).into_bytes()),
        // Styles, including extended colors
        1 => (30u16..38).prop_map(|c| format!("\x1b[{}m", c).into_bytes()),
        1 => (0u16..=255u16).prop_map(|n| format!("\x1b[38;5;{}m", n).into_bytes()),
    ]
}

fn script() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(fragment(), 1..40).prop_map(|frags| frags.concat())
}

proptest! {
    #[test]
    fn whole_vs_split_chunks_agree(
        script in script(),
        splits in prop::collection::vec(0usize..512, 0..12),
    ) {
        let mut splits = splits;
        splits.sort_unstable();

        let whole = snapshot_of(&[script.as_slice()]);
        let split = feed_split(&script, &splits);

        prop_assert_eq!(whole, split);
    }

    #[test]
    fn byte_at_a_time_agrees(script in script()) {
        let whole = snapshot_of(&[script.as_slice()]);

        let mut term = Terminal::new(ROWS, COLS);
        for &byte in &script {
            term.process(&[byte]);
        }

        prop_assert_eq!(whole, term.snapshot());
    }
}

#[test]
fn test_three_byte_scalar_appears_only_after_third_byte() {
    let bytes = "中".as_bytes();
    let mut term = Terminal::new(ROWS, COLS);

    term.process(&bytes[..1]);
    assert!(term.state().grid().cell(0, 0).is_empty());
    assert_eq!(term.state().cursor().col, 0);

    term.process(&bytes[1..2]);
    assert!(term.state().grid().cell(0, 0).is_empty());

    term.process(&bytes[2..]);
    assert_eq!(term.state().grid().cell(0, 0).ch, Some('中'));
    assert_eq!(term.state().cursor().col, 1);
}

#[test]
fn test_csi_split_at_every_boundary() {
    let script = b"\x1b[2;3Hxy\x1b[31mz";
    let whole = snapshot_of(&[&script[..]]);

    for split in 0..=script.len() {
        let parted = snapshot_of(&[&script[..split], &script[split..]]);
        assert_eq!(whole, parted, "diverged when split at byte {}", split);
    }
}

#[test]
fn test_osc_split_at_every_boundary() {
    let script = b"A\x1b]0;some title\x1b\\B\x1b]x\x07C";
    let whole = snapshot_of(&[&script[..]]);

    for split in 0..=script.len() {
        let parted = snapshot_of(&[&script[..split], &script[split..]]);
        assert_eq!(whole, parted, "diverged when split at byte {}", split);
    }
}

#[test]
fn test_pending_sequence_survives_empty_reads() {
    let mut term = Terminal::new(ROWS, COLS);
    term.process(b"\x1b[3");
    term.process(b"");
    term.process(b"");
    term.process(b"1mX");
    assert_eq!(term.state().row_text(0), "X");
    assert_eq!(
        term.state().grid().cell(0, 0).style.fg,
        dango_terminal::core::Color::RED
    );
}
