mod support;

use std::{num::NonZeroU32, path::PathBuf};

use comment_labeler::{
    config::{self, CONFIG_FILE_NAME},
    corpus::CommentStore,
    labels::{Label, LongStore, StoreError, WideStore},
    session::{Intent, LabelingController, Notice, Screen},
};
use support::{
    fixtures::{config_in, read, write_comments},
    labeler_env::LabelerEnvGuard,
};
use tempfile::TempDir;

const WORKED_EXAMPLE: [(&str, &str); 3] = [
    ("c1", "The bus was late"),
    ("c2", "Driver was rude"),
    ("c3", "Clean seats"),
];

struct Harness {
    temp: TempDir,
    controller: LabelingController,
}

impl Harness {
    fn new(rows: &[(&str, &str)]) -> Self {
        let temp = tempfile::tempdir().expect("create tempdir");
        write_comments(&temp.path().join("comments.csv"), rows);
        let controller = Self::open(&temp);
        Self { temp, controller }
    }

    fn open(temp: &TempDir) -> LabelingController {
        LabelingController::open(&config_in(temp.path())).expect("open controller")
    }

    /// Simulate a restart against the same files.
    fn reopen(&mut self) {
        self.controller = Self::open(&self.temp);
    }

    fn start(&mut self, category: &str, target: u32) {
        let category = self
            .controller
            .categories()
            .get(category)
            .cloned()
            .expect("configured category");
        self.controller
            .dispatch(Intent::StartLabeling {
                category,
                target_true: NonZeroU32::new(target).expect("non-zero target"),
            })
            .expect("start labeling");
    }

    fn submit(&mut self, label: Label) {
        self.controller
            .dispatch(Intent::Submit(label))
            .expect("submit label");
    }

    fn current_id(&self) -> Option<String> {
        match self.controller.screen() {
            Screen::Labeling { comment, .. } => Some(comment.id.as_str().to_string()),
            _ => None,
        }
    }

    fn long_store(&self) -> String {
        read(self.temp.path().join("labels.csv"))
    }

    fn wide_store(&self) -> String {
        read(self.temp.path().join("labels_wide.csv"))
    }
}

#[test]
fn worked_example_reaches_goal_and_writes_both_stores() {
    let mut harness = Harness::new(&WORKED_EXAMPLE);
    harness.start("Safety", 2);
    assert_eq!(harness.current_id().as_deref(), Some("c1"));

    harness.submit(Label::True);
    assert_eq!(harness.current_id().as_deref(), Some("c2"));
    harness.submit(Label::True);

    assert!(matches!(
        harness.controller.screen(),
        Screen::Congrats { target_true, .. } if target_true.get() == 2
    ));
    assert_eq!(
        harness.long_store(),
        "comment_id,comment_text,category,label\n\
         c1,The bus was late,Safety,1\n\
         c2,Driver was rude,Safety,1\n"
    );
    assert_eq!(
        harness.wide_store(),
        "comment_id,comment_text,Safety,Punctuality,Cleanliness,Driver Attitude\n\
         c1,The bus was late,1,,,\n\
         c2,Driver was rude,1,,,\n"
    );
}

#[test]
fn exhausted_pool_is_distinct_from_congrats() {
    let mut harness = Harness::new(&WORKED_EXAMPLE[..2]);
    harness.start("Cleanliness", 5);
    harness.submit(Label::True);
    harness.submit(Label::False);

    assert!(matches!(
        harness.controller.screen(),
        Screen::Exhausted { progress, .. } if progress.true_count == 1 && progress.false_count == 1
    ));

    harness.controller.dispatch(Intent::Finish).unwrap();
    assert!(matches!(harness.controller.screen(), Screen::FinishModal { .. }));
    harness.controller.dispatch(Intent::HomeFromModal).unwrap();
    assert!(matches!(harness.controller.screen(), Screen::Setup { .. }));
}

#[test]
fn labeled_comments_leave_the_pool_immediately() {
    let mut harness = Harness::new(&WORKED_EXAMPLE);
    harness.start("Punctuality", 10);
    harness.controller.dispatch(Intent::BumpIndex(1)).unwrap();
    assert_eq!(harness.current_id().as_deref(), Some("c2"));

    harness.submit(Label::False);
    let Screen::Labeling {
        comment, pool_len, ..
    } = harness.controller.screen()
    else {
        panic!("expected labeling screen");
    };
    assert_eq!(pool_len, 2);
    assert_ne!(comment.id.as_str(), "c2");

    harness.controller.dispatch(Intent::BumpIndex(5)).unwrap();
    assert_eq!(harness.current_id().as_deref(), Some("c3"));
    harness.controller.dispatch(Intent::BumpIndex(-5)).unwrap();
    assert_eq!(harness.current_id().as_deref(), Some("c1"));
}

#[test]
fn goal_does_not_fire_again_after_returning_home() {
    let mut harness = Harness::new(&WORKED_EXAMPLE);
    harness.start("Safety", 1);
    harness.submit(Label::True);
    assert!(matches!(harness.controller.screen(), Screen::Congrats { .. }));

    harness.controller.dispatch(Intent::HomeFromModal).unwrap();
    harness.start("Safety", 1);
    let Screen::Labeling { progress, .. } = harness.controller.screen() else {
        panic!("expected a fresh labeling run");
    };
    assert_eq!(progress.true_count, 0);
    assert_eq!(harness.current_id().as_deref(), Some("c2"));

    harness.submit(Label::False);
    assert!(matches!(harness.controller.screen(), Screen::Labeling { .. }));
}

/// Controller whose long store sits under a regular file, so every save
/// fails until `unblock` turns the blocker into a directory. The Safety run
/// is started with a goal of one TRUE label.
struct BlockedStore {
    temp: TempDir,
    controller: LabelingController,
}

impl BlockedStore {
    fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let comments_path = temp.path().join("comments.csv");
        write_comments(&comments_path, &WORKED_EXAMPLE);
        std::fs::write(temp.path().join("blocker"), "not a directory").unwrap();

        let comments = CommentStore::load(&comments_path).unwrap();
        let store = LongStore::new(
            temp.path().join("blocker").join("labels.csv"),
            WideStore::new(temp.path().join("labels_wide.csv")),
            config_in(temp.path()).category_set().unwrap(),
        );
        let mut controller = LabelingController::new(comments, store, NonZeroU32::new(1).unwrap());
        let safety = controller.categories().get("Safety").cloned().unwrap();
        controller
            .dispatch(Intent::StartLabeling {
                category: safety,
                target_true: NonZeroU32::new(1).unwrap(),
            })
            .unwrap();
        Self { temp, controller }
    }

    fn blocker(&self) -> PathBuf {
        self.temp.path().join("blocker")
    }

    fn unblock(&self) {
        std::fs::remove_file(self.blocker()).unwrap();
        std::fs::create_dir(self.blocker()).unwrap();
    }
}

#[test]
fn failed_save_keeps_label_and_retry_completes_goal() {
    let BlockedStore {
        temp,
        mut controller,
    } = BlockedStore::new();
    let blocker = temp.path().join("blocker");

    let err = controller.dispatch(Intent::Submit(Label::True)).unwrap_err();
    assert!(matches!(err, StoreError::Write { .. }));
    assert!(controller.has_unsaved());
    controller.dismiss_notice();
    assert!(matches!(controller.notice(), Some(Notice::SaveFailed(_))));
    assert!(matches!(
        controller.screen(),
        Screen::Labeling { progress, .. } if progress.true_count == 1
    ));

    std::fs::remove_file(&blocker).unwrap();
    std::fs::create_dir(&blocker).unwrap();
    controller.retry_persist().unwrap();

    assert!(!controller.has_unsaved());
    assert_eq!(controller.notice(), None);
    assert!(matches!(controller.screen(), Screen::Congrats { .. }));
    assert_eq!(
        read(blocker.join("labels.csv")),
        "comment_id,comment_text,category,label\nc1,The bus was late,Safety,1\n"
    );
}

#[test]
fn goal_saved_under_finish_modal_shows_after_cancel() {
    let mut blocked = BlockedStore::new();
    assert!(blocked.controller.dispatch(Intent::Submit(Label::True)).is_err());
    blocked.controller.dispatch(Intent::Finish).unwrap();

    blocked.unblock();
    blocked.controller.retry_persist().unwrap();
    assert!(matches!(blocked.controller.screen(), Screen::FinishModal { .. }));

    blocked.controller.dispatch(Intent::CancelFinish).unwrap();
    assert!(matches!(
        blocked.controller.screen(),
        Screen::Congrats { target_true, .. } if target_true.get() == 1
    ));
}

#[test]
fn unsaved_goal_stays_hidden_after_cancel() {
    let mut blocked = BlockedStore::new();
    assert!(blocked.controller.dispatch(Intent::Submit(Label::True)).is_err());
    blocked.controller.dispatch(Intent::Finish).unwrap();
    blocked.controller.dispatch(Intent::CancelFinish).unwrap();

    assert!(blocked.controller.has_unsaved());
    assert!(matches!(blocked.controller.screen(), Screen::Labeling { .. }));
}

#[test]
fn saving_a_category_keeps_labels_of_removed_comments() {
    let mut harness = Harness::new(&WORKED_EXAMPLE);
    std::fs::write(
        harness.temp.path().join("labels.csv"),
        "comment_id,comment_text,category,label\n\
         gone,Old comment,Safety,1\n\
         gone,Old comment,Punctuality,0\n",
    )
    .unwrap();
    harness.reopen();

    harness.start("Safety", 5);
    harness.submit(Label::True);

    assert_eq!(
        harness.long_store(),
        "comment_id,comment_text,category,label\n\
         gone,Old comment,Punctuality,0\n\
         c1,The bus was late,Safety,1\n\
         gone,Old comment,Safety,1\n"
    );
    let summary = harness.controller.summary();
    assert_eq!(summary.orphaned_records, 2);
    assert_eq!(summary.rows[0].true_count, 1);
}

#[test]
fn labels_accumulate_across_sessions_and_categories() {
    let mut harness = Harness::new(&WORKED_EXAMPLE);
    harness.start("Punctuality", 3);
    harness.submit(Label::True);
    harness.controller.dispatch(Intent::Finish).unwrap();
    harness.controller.dispatch(Intent::HomeFromModal).unwrap();

    harness.start("Safety", 3);
    harness.submit(Label::False);

    harness.reopen();
    harness.start("Safety", 3);
    assert_eq!(harness.current_id().as_deref(), Some("c2"));
    harness.submit(Label::True);

    assert_eq!(
        harness.long_store(),
        "comment_id,comment_text,category,label\n\
         c1,The bus was late,Punctuality,1\n\
         c1,The bus was late,Safety,0\n\
         c2,Driver was rude,Safety,1\n"
    );
    assert_eq!(
        harness.wide_store(),
        "comment_id,comment_text,Safety,Punctuality,Cleanliness,Driver Attitude\n\
         c1,The bus was late,0,1,,\n\
         c2,Driver was rude,1,,,\n"
    );

    let summary = harness.controller.summary();
    let safety = &summary.rows[0];
    assert_eq!((safety.true_count, safety.false_count), (1, 1));
    assert_eq!((safety.labeled, safety.unlabeled), (2, 1));
    assert_eq!(summary.total.labeled, 3);
    assert_eq!(summary.total.unlabeled, 9);
    assert_eq!(summary.orphaned_records, 0);
}

#[test]
fn unreadable_store_is_reported_and_never_overwritten() {
    let temp = tempfile::tempdir().unwrap();
    write_comments(&temp.path().join("comments.csv"), &WORKED_EXAMPLE);
    let broken = "comment_id,comment_text,category,label\nc1,The bus was late,Safety,maybe\n";
    std::fs::write(temp.path().join("labels.csv"), broken).unwrap();

    let mut controller = LabelingController::open(&config_in(temp.path())).unwrap();
    assert!(matches!(controller.notice(), Some(Notice::StoreUnreadable(_))));
    assert!(controller.persisted().is_empty());

    let safety = controller.categories().get("Safety").cloned().unwrap();
    controller
        .dispatch(Intent::StartLabeling {
            category: safety,
            target_true: NonZeroU32::new(2).unwrap(),
        })
        .unwrap();
    let err = controller.dispatch(Intent::Submit(Label::True)).unwrap_err();
    assert!(err.is_read_failure());
    assert_eq!(read(temp.path().join("labels.csv")), broken);
    assert!(!temp.path().join("labels_wide.csv").exists());
}

#[test]
fn open_from_config_home_embeds_generated_ids() {
    let temp = tempfile::tempdir().unwrap();
    let data = temp.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("comments.csv"),
        "comment_text,route\nLate again,12\nSpotless,7\n",
    )
    .unwrap();

    let config_home = temp.path().join("config");
    let _env = LabelerEnvGuard::set_config_home(config_home.clone());
    let config = config::LabelerConfig {
        embed_generated_ids: true,
        ..config_in(&data)
    };
    config::save_to_path(&config, &config::config_path().unwrap()).unwrap();
    assert!(
        config_home
            .join(".comment_labeler")
            .join(CONFIG_FILE_NAME)
            .is_file()
    );

    let loaded = config::load_or_default().unwrap();
    assert_eq!(loaded, config);
    let first = LabelingController::open(&loaded).unwrap();
    let rewritten = read(data.join("comments.csv"));
    assert!(rewritten.starts_with("comment_id,comment_text,route\n"));

    let second = LabelingController::open(&loaded).unwrap();
    let ids = |controller: &LabelingController| -> Vec<String> {
        controller
            .comments()
            .iter()
            .map(|comment| comment.id.as_str().to_string())
            .collect()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(second.comments().generated_ids(), 0);
}
