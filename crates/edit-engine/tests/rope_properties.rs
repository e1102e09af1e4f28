use edit_engine::{LEAF_SIZE, Rope};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[char] = &['a', 'b', 'z', ' ', '\n', 'é', '日', '🙂'];

fn random_text(rng: &mut StdRng, max_len: usize) -> String {
    let len = rng.gen_range(0..=max_len);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

fn assert_matches_oracle(rope: &Rope, oracle: &ropey::Rope) {
    assert_eq!(rope.len(), oracle.len_chars());
    assert_eq!(rope.line_count(), oracle.len_lines());
    assert_eq!(rope.text(), oracle.to_string());

    for line in 0..rope.line_count() {
        assert_eq!(
            rope.line_start_offset(line).unwrap(),
            oracle.line_to_char(line)
        );
        let expected = oracle.line(line).to_string();
        assert_eq!(
            rope.line_text(line).unwrap(),
            expected.strip_suffix('\n').unwrap_or(&expected)
        );
    }
}

#[test]
fn test_random_edits_match_reference_rope() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut rope = Rope::new();
    let mut oracle = ropey::Rope::new();

    for step in 0..600 {
        let len = rope.len();
        if len > 0 && rng.gen_bool(0.4) {
            let start = rng.gen_range(0..len);
            let end = rng.gen_range(start..=len.min(start + 700));
            rope.delete(start, end).unwrap();
            oracle.remove(start..end);
        } else {
            let pos = rng.gen_range(0..=len);
            let text = random_text(&mut rng, if step % 50 == 0 { 3000 } else { 40 });
            rope.insert(pos, &text).unwrap();
            oracle.insert(pos, &text);
        }

        if step % 25 == 0 {
            assert_matches_oracle(&rope, &oracle);
        }
    }
    assert_matches_oracle(&rope, &oracle);
}

#[test]
fn test_line_at_offset_is_monotone_and_consistent() {
    let mut rng = StdRng::seed_from_u64(11);
    let text = random_text(&mut rng, 5000);
    let rope = Rope::from_text(&text);
    let oracle = ropey::Rope::from_str(&text);

    let mut previous = 0;
    for pos in 0..=rope.len() {
        let line = rope.line_at_offset(pos).unwrap();
        assert!(line >= previous);
        assert_eq!(line, oracle.char_to_line(pos));
        assert!(rope.line_start_offset(line).unwrap() <= pos);
        previous = line;
    }
    assert_eq!(previous, rope.line_count() - 1);
}

#[test]
fn test_insert_then_delete_restores_text() {
    let mut rng = StdRng::seed_from_u64(3);
    let original = random_text(&mut rng, 4 * LEAF_SIZE);
    let mut rope = Rope::from_text(&original);

    for _ in 0..200 {
        let pos = rng.gen_range(0..=rope.len());
        let text = random_text(&mut rng, 900);
        let inserted = text.chars().count();
        rope.insert(pos, &text).unwrap();
        assert_eq!(rope.substring(pos, pos + inserted).unwrap(), text);
        rope.delete(pos, pos + inserted).unwrap();
        assert_eq!(rope.len(), original.chars().count());
    }
    assert_eq!(rope.text(), original);
}

#[test]
fn test_build_round_trips() {
    let long_line = "x".repeat(3 * LEAF_SIZE + 7);
    let all_newlines = "\n".repeat(LEAF_SIZE + 1);
    for text in ["", "a", "\n", long_line.as_str(), all_newlines.as_str()] {
        let rope = Rope::from_text(text);
        assert_eq!(rope.text(), text);
        assert_eq!(rope.len(), text.chars().count());
        assert_eq!(rope.line_count(), text.matches('\n').count() + 1);
        assert_eq!(rope.to_string(), text);
    }
    let rope = Rope::from_text(&all_newlines);
    assert_eq!(rope.line_at_offset(LEAF_SIZE + 1).unwrap(), LEAF_SIZE + 1);
}

#[test]
fn test_chunks_concatenate_to_text() {
    let text: String = "line of text\n".repeat(400);
    let rope = Rope::from_text(&text);
    assert!(rope.chunks().all(|chunk| chunk.chars().count() <= LEAF_SIZE));
    assert_eq!(rope.chunks().collect::<String>(), text);
    assert_eq!(
        rope.chunks_in_range(13, 26).unwrap().collect::<String>(),
        "line of text\n"
    );
}

#[test]
fn test_height_stays_logarithmic_under_appends() {
    let mut rope = Rope::new();
    for i in 0..5000 {
        let len = rope.len();
        rope.insert(len, &format!("{i}\n")).unwrap();
    }
    assert_eq!(rope.line_count(), 5001);
    assert!(rope.height() <= 16, "height {}", rope.height());
}
