//! EditorSession property tests
//!
//! 保存・読み込みの往復、変更フラグの冪等性、ファインダー選択の範囲を検証する

use afaire::finder::Direction;
use afaire::EditorSession;
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use std::fs;
use tempfile::tempdir;

fn note_content() -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<char>(), 0..256).prop_map(|chars| chars.into_iter().collect())
}

fn file_names() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[a-c]{1,4}", 0..8).prop_map(|set| set.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn save_then_load_round_trips(content in note_content()) {
        let dir = tempdir().unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();

        session.create("note.txt").unwrap();
        let slot = session.open("note.txt").unwrap();
        session.replace_content(&content);
        session.save().unwrap();

        prop_assert_eq!(fs::read_to_string(dir.path().join("note.txt")).unwrap(), content.clone());

        session.close(slot);
        session.open("note.txt").unwrap();
        prop_assert_eq!(session.active_buffer().content(), content.as_str());
        prop_assert!(!session.active_buffer().is_dirty());
    }

    #[test]
    fn repeated_edits_change_label_once(edits in 1usize..50) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        let mut session = EditorSession::with_directory(dir.path()).unwrap();
        session.open("a.txt").unwrap();
        let before = session.active_buffer().label_revision();

        for _ in 0..edits {
            session.mark_edited();
        }
        prop_assert_eq!(session.active_buffer().label_revision(), before + 1);
        prop_assert_eq!(session.active_buffer().display_label(), "* a.txt");
    }

    #[test]
    fn finder_selection_stays_in_bounds(
        names in file_names(),
        query in "[a-c]{0,2}",
        moves in proptest::collection::vec(any::<bool>(), 0..30)
    ) {
        let dir = tempdir().unwrap();
        for name in &names {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let mut session = EditorSession::with_directory(dir.path()).unwrap();
        session.scan_directory().unwrap();
        session.fuzzy_open();
        session.fuzzy_query_changed(&query);

        for down in moves {
            session.fuzzy_move(if down { Direction::Down } else { Direction::Up });
            let count = session.fuzzy_match_count();
            match session.finder().selection() {
                Some(index) => prop_assert!(index < count),
                None => prop_assert_eq!(count, 0),
            }
        }
        prop_assert!(session.buffers().invariants_hold());
    }
}
