//! Plain-text chord listings and text-to-chord lookup.

use anyhow::{bail, Result};
use c7k_keymap::{ChordTable, Combo, Keycode, ModifierKind, KEY_COUNT};

/// Render a combo as a 7-column key diagram, `#` for a held key.
fn diagram(combo: Combo) -> String {
    (0..KEY_COUNT as u8)
        .map(|k| if combo.contains(k) { '#' } else { '.' })
        .collect()
}

fn row(combo: Combo, output: &str) -> String {
    let keys = combo.to_string();
    format!("{}  {keys:<10}  {output}", diagram(combo))
}

/// Print every layer of the table.
pub fn print_table(table: &ChordTable) {
    println!("keys     combo       output");
    println!("{}", row(table.mouse_trigger(), "Mouse layer toggle"));
    println!("{}", row(table.layer_trigger(), "Modifier layer"));
    println!();
    println!("Base layer");
    for &(combo, key) in table.entries() {
        println!("{}", row(combo, key.name()));
    }
    println!();
    println!("Modifier layer");
    for &(combo, kind) in table.modifiers() {
        println!("{}", row(combo, kind.name()));
    }
    println!();
    println!("Mouse layer");
    for &(combo, (dx, dy)) in table.mouse_moves() {
        println!("{}", row(combo, &format!("{dx:+},{dy:+}")));
    }
}

/// Chords that type `c`: the plain chord, or the modifier-layer sequence
/// for characters that need Shift.
pub fn chords_for(table: &ChordTable, c: char) -> Option<Vec<Combo>> {
    // `?` is what unprintable keys echo as.
    if c == '?' {
        return None;
    }
    let plain = find_key(table, |key| key.echo(None) == c);
    if let Some((combo, _)) = plain {
        return Some(vec![combo]);
    }
    let shifted = find_key(table, |key| key.echo(Some(ModifierKind::Shift)) == c)?;
    let pick = table
        .modifiers()
        .iter()
        .find(|&&(_, kind)| kind == ModifierKind::Shift)
        .map(|&(combo, _)| combo)?;
    Some(vec![table.layer_trigger(), pick, shifted.0])
}

fn find_key(table: &ChordTable, pred: impl Fn(Keycode) -> bool) -> Option<(Combo, Keycode)> {
    table.entries().iter().copied().find(|&(_, key)| pred(key))
}

/// Print the chord sequence for each character of `text`.
pub fn print_lookup(table: &ChordTable, text: &str) -> Result<()> {
    let mut missing = Vec::new();
    for c in text.chars() {
        match chords_for(table, c) {
            Some(chords) => {
                let steps: Vec<String> = chords
                    .iter()
                    .map(|&combo| format!("{} ({combo})", diagram(combo)))
                    .collect();
                println!("{:?}  {}", c, steps.join("  then  "));
            }
            None => {
                println!("{c:?}  no chord");
                missing.push(c);
            }
        }
    }
    if !missing.is_empty() {
        bail!("no chord for {missing:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagram_marks_held_keys() {
        assert_eq!(diagram(Combo::of(&[0, 5])), "#....#.");
        assert_eq!(diagram(Combo::EMPTY), ".......");
    }

    #[test]
    fn rows_are_aligned() {
        assert_eq!(row(Combo::of(&[0, 1]), "R"), "##.....  0+1         R");
    }

    #[test]
    fn lowercase_is_one_chord() {
        let table = ChordTable::builtin().unwrap();
        assert_eq!(chords_for(&table, 'r'), Some(vec![Combo::of(&[0, 1])]));
        assert_eq!(chords_for(&table, ' ').map(|c| c.len()), Some(1));
    }

    #[test]
    fn shifted_goes_through_modifier_layer() {
        let table = ChordTable::builtin().unwrap();
        assert_eq!(
            chords_for(&table, 'R'),
            Some(vec![table.layer_trigger(), Combo::of(&[0]), Combo::of(&[0, 1])])
        );
        assert_eq!(
            chords_for(&table, '!'),
            Some(vec![table.layer_trigger(), Combo::of(&[0]), Combo::of(&[0, 4])])
        );
    }

    #[test]
    fn unknown_characters() {
        let table = ChordTable::builtin().unwrap();
        assert_eq!(chords_for(&table, '~'), None);
        assert_eq!(chords_for(&table, '?'), None);
        assert!(print_lookup(&table, "a~").is_err());
    }
}
