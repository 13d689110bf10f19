//! Property tests: library conservation, single copy per library, idempotence.

mod support;

use proptest::prelude::*;
use std::collections::BTreeSet;

use skinny_ear::library::RelocationEngine;
use skinny_ear::{EarModule, LibraryFilter};
use support::*;

const LIBRARIES: [&str; 6] = [
    "aspectjrt-1.9.jar",
    "commons-io.jar",
    "guava.jar",
    "jackson.jar",
    "log4j-core.jar",
    "slf4j-api.jar",
];

/// Library subsets for the ear and up to four wars
fn bundle() -> impl Strategy<Value = (Vec<bool>, Vec<Vec<bool>>)> {
    (
        prop::collection::vec(any::<bool>(), LIBRARIES.len()),
        prop::collection::vec(
            prop::collection::vec(any::<bool>(), LIBRARIES.len()),
            1..=4,
        ),
    )
}

fn pick(mask: &[bool]) -> Vec<&'static str> {
    LIBRARIES
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(name, _)| *name)
        .collect()
}

fn build(env: &TestEnvironment, ear_libs: &[bool], wars: &[Vec<bool>]) -> std::path::PathBuf {
    let mut builder = EarBuilder::new("app.ear");
    for library in pick(ear_libs) {
        builder = builder.ear_library(library);
    }
    for (i, war) in wars.iter().enumerate() {
        builder = builder.war(&format!("web{i}.war"), &pick(war));
    }
    env.build(&builder)
}

fn holders(ear: &EarModule, library: &str) -> usize {
    ear.all_modules().filter(|m| m.has_library(library)).count()
}

fn all_libraries(ear: &EarModule) -> BTreeSet<String> {
    ear.all_modules()
        .flat_map(|m| m.library_names().unwrap())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_relocation_conserves_and_deduplicates((ear_libs, wars) in bundle()) {
        let env = TestEnvironment::new();
        let ear = build(&env, &ear_libs, &wars);
        let open = env.open(&ear);
        let before = all_libraries(&open.ear);

        let engine = RelocationEngine::new(&open.ear, &[], &[]);
        let plan = engine.plan(open.ear.module()).unwrap();
        engine.apply(&plan).unwrap();

        prop_assert_eq!(all_libraries(&open.ear), before.clone());
        for library in &before {
            prop_assert_eq!(holders(&open.ear, library), 1);
            let action = plan.action(library).unwrap();
            if action.operations() > 0 {
                prop_assert!(open.ear.module().has_library(library));
            }
        }
    }

    #[test]
    fn prop_forced_libraries_end_in_ear((ear_libs, wars) in bundle()) {
        let env = TestEnvironment::new();
        let ear = build(&env, &ear_libs, &wars);
        let open = env.open(&ear);
        let pinned = [LibraryFilter::exact("guava.jar")];
        let forced = [LibraryFilter::prefix("aspectjrt")];
        let guava_before = holders(&open.ear, "guava.jar");

        let engine = RelocationEngine::new(&open.ear, &pinned, &forced);
        engine.apply(&engine.plan(open.ear.module()).unwrap()).unwrap();

        prop_assert_eq!(holders(&open.ear, "guava.jar"), guava_before);
        let aspectj = "aspectjrt-1.9.jar";
        if all_libraries(&open.ear).contains(aspectj) {
            prop_assert!(open.ear.module().has_library(aspectj));
            prop_assert_eq!(holders(&open.ear, aspectj), 1);
        }
    }

    #[test]
    fn prop_second_pass_is_noop((ear_libs, wars) in bundle()) {
        let env = TestEnvironment::new();
        let ear = build(&env, &ear_libs, &wars);
        let open = env.open(&ear);
        let shared = open.ear.module_named("web0.war").unwrap();

        let engine = RelocationEngine::new(&open.ear, &[], &[]);
        engine.apply(&engine.plan(shared).unwrap()).unwrap();
        let settled = snapshot(&ear);

        let again = engine.plan(shared).unwrap();
        prop_assert!(again.is_noop());
        prop_assert_eq!(engine.apply(&again).unwrap(), 0);
        prop_assert_eq!(snapshot(&ear), settled);
    }
}
