//! Text rendering of display lists.

use crate::gbi::{self, Gfx};
use crate::types::DisplayList;

/// Resolves an asset hash to its path.
pub type HashResolver<'a> = &'a dyn Fn(u64) -> Option<String>;

/// Render one line per command.
///
/// Each line shows the index of the first instruction, the opcode name and
/// the raw words. Extended instructions append their hash, resolved to a path
/// when `resolver` knows it; path-referencing instructions append the string
/// table entry.
pub fn disassemble(list: &DisplayList, resolver: Option<HashResolver<'_>>) -> String {
    let mut out = String::new();

    for (index, words) in list.commands() {
        let first = words[0];
        let opcode = first.opcode();
        let name = gbi::opcode_name(opcode).unwrap_or("UNKNOWN");

        out.push_str(&format!(
            "{index:04}: {name:<24} {:08X} {:08X}",
            first.w0, first.w1
        ));

        if let Some(&payload) = words.get(1) {
            if gbi::is_wide(opcode) {
                write_hash(&mut out, payload, resolver);
            } else {
                out.push_str(&format!(" +{:08X}", payload.w0));
            }
        }
        if gbi::uses_string_table(opcode) {
            match list.string(first.w1) {
                Some(path) => out.push_str(&format!(" \"{path}\"")),
                None => out.push_str(" <bad string index>"),
            }
        }
        out.push('\n');
    }

    out
}

fn write_hash(out: &mut String, payload: Gfx, resolver: Option<HashResolver<'_>>) {
    let hash = gbi::word_hash(payload);
    match resolver.and_then(|resolve| resolve(hash)) {
        Some(path) => out.push_str(&format!(" -> {path}")),
        None => out.push_str(&format!(" -> {hash:#018x}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_basic() {
        let list = DisplayList::new(vec![
            gbi::dp_pipe_sync(),
            Gfx::new(0x4200_0000, 0),
            gbi::sp_end_display_list(),
        ]);
        let text = disassemble(&list, None);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("0000: G_RDPPIPESYNC"));
        assert!(lines[1].contains("UNKNOWN"));
        assert!(lines[2].contains("G_ENDDL"));
    }

    #[test]
    fn test_line_layout() {
        let list = DisplayList::new(vec![gbi::dp_pipe_sync(), gbi::sp_end_display_list()]);
        let text = disassemble(&list, None);

        assert_eq!(
            text.lines().next(),
            Some(format!("0000: {:<24} E7000000 00000000", "G_RDPPIPESYNC").as_str())
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_wide_instruction_resolves_hash() {
        let mut words = gbi::sp_display_list_hash(0xAABB_CCDD_0011_2233, false).to_vec();
        words.push(gbi::sp_end_display_list());
        let list = DisplayList::new(words);

        let resolve = |hash: u64| (hash == 0xAABB_CCDD_0011_2233).then(|| "objects/dl".to_string());
        let resolver: HashResolver<'_> = &resolve;
        let text = disassemble(&list, Some(resolver));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("G_DL_OTR_HASH"));
        assert!(lines[0].ends_with("-> objects/dl"));
        assert!(lines[1].starts_with("0002: G_ENDDL"));

        let unresolved = disassemble(&list, None);
        assert!(unresolved.contains("0xaabbccdd00112233"));
    }

    #[test]
    fn test_string_table_path() {
        let mut list = DisplayList::default();
        let index = list.push_string("textures/grass");
        list.instructions.push(Gfx::new(
            (gbi::G_SETTIMG_OTR_FILEPATH as u32) << 24,
            index,
        ));
        list.instructions.push(gbi::sp_end_display_list());

        let text = disassemble(&list, None);
        assert!(text.contains("G_SETTIMG_OTR_FILEPATH"));
        assert!(text.contains("\"textures/grass\""));
    }
}
