use noise_survey::survey::area::all_paths;
use noise_survey::survey::domain::{Area, SurveyData};
use noise_survey::survey::{AreaError, AreaPath};
use proptest::prelude::*;

/// Build a tree where every node's name spells its original position.
fn tree(shape: &[Vec<usize>]) -> Vec<Area> {
    shape
        .iter()
        .enumerate()
        .map(|(main, subs)| {
            let main_name = format!("m{main}");
            let sub_areas = subs
                .iter()
                .enumerate()
                .map(|(sub, ss_count)| {
                    let sub_name = format!("{main_name}.s{sub}");
                    let ss_areas = (0..*ss_count)
                        .map(|ss| Area::new(format!("{sub_name}.ss{ss}"), format!("{sub_name}.ss{ss}")))
                        .collect();
                    Area::new(sub_name.clone(), sub_name).with_sub_areas(ss_areas)
                })
                .collect();
            Area::new(main_name.clone(), main_name).with_sub_areas(sub_areas)
        })
        .collect()
}

/// Every node gets a comment equal to its own name.
fn labelled_survey(shape: &[Vec<usize>]) -> SurveyData {
    let mut data = SurveyData {
        areas: tree(shape),
        ..SurveyData::default()
    };
    for path in all_paths(&data.areas) {
        let name = path
            .resolve(&data.areas)
            .map(|area| area.name.clone())
            .expect("path from the tree resolves");
        data.comments_by_area.insert(path.key(), name);
    }
    data
}

fn shapes() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..4, 0..4), 1..5)
}

proptest! {
    #[test]
    fn removal_keeps_every_surviving_entry_on_its_own_area(
        shape in shapes(),
        pick in any::<prop::sample::Index>(),
    ) {
        let data = labelled_survey(&shape);
        let paths = all_paths(&data.areas);
        let removed = paths[pick.index(paths.len())];
        let removed_name = removed
            .resolve(&data.areas)
            .map(|area| area.name.clone())
            .expect("picked path resolves");

        let after = data.clone().remove_area(&removed).expect("existing area removes");

        prop_assert!(after.orphaned_keys().is_empty());
        prop_assert_eq!(after.comments_by_area.len(), all_paths(&after.areas).len());
        for (key, comment) in &after.comments_by_area {
            let area = key.path().resolve(&after.areas).expect("key resolves");
            prop_assert_eq!(&area.name, comment);
            let removed_prefix = format!("{removed_name}.");
            prop_assert!(!comment.starts_with(&removed_prefix) && comment != &removed_name);
        }
    }

    #[test]
    fn shifted_paths_never_collide(
        shape in shapes(),
        pick in any::<prop::sample::Index>(),
    ) {
        let areas = tree(&shape);
        let paths = all_paths(&areas);
        let removed = paths[pick.index(paths.len())];

        let mut shifted: Vec<AreaPath> = paths
            .iter()
            .filter_map(|path| path.shift_after_removal(&removed))
            .collect();
        let survivors = shifted.len();
        shifted.sort();
        shifted.dedup();
        prop_assert_eq!(shifted.len(), survivors);
    }
}

#[test]
fn removing_a_missing_area_is_an_error() {
    let data = labelled_survey(&[vec![1]]);
    let result = data.remove_area(&AreaPath::sub(0, 3));
    assert_eq!(result, Err(AreaError::NotFound(AreaPath::sub(0, 3).key())));
}

#[test]
fn removing_a_main_area_drops_its_subtree_and_shifts_later_mains() {
    let data = labelled_survey(&[vec![2], vec![], vec![1]]);
    let after = data.remove_area(&AreaPath::main(0)).expect("main area removes");

    assert_eq!(after.areas.len(), 2);
    assert_eq!(
        after.comments_by_area.get(&AreaPath::main(0).key()).map(String::as_str),
        Some("m1")
    );
    assert_eq!(
        after
            .comments_by_area
            .get(&AreaPath::sub_sub(1, 0, 0).key())
            .map(String::as_str),
        Some("m2.s0.ss0")
    );
    assert!(after
        .comments_by_area
        .values()
        .all(|comment| !comment.starts_with("m0")));
}
