//! End-to-end bootstrap runs against in-process entry types.
//!
//! Each test lays out a throwaway home directory, seeds a store the way the
//! CLI would, and drives [`Bootstrap::run`] to completion.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use launchpad_config::{ConfigError, ConfigStore};
use launchpad_loader::{
    Bootstrap, DispatchOutcome, Dispatcher, EntryResolver, EntryValue, LoaderError, NativeEntry,
    NativeRegistry,
};
use tokio_util::sync::CancellationToken;

fn home() -> tempfile::TempDir {
    let home = tempfile::tempdir().unwrap();
    std::fs::create_dir(home.path().join("lib")).unwrap();
    home
}

fn store(home: &Path, init: &str) -> ConfigStore {
    [
        ("boot.prefix".to_owned(), "shop".to_owned()),
        ("shop.home".to_owned(), home.display().to_string()),
        ("shop.init".to_owned(), init.to_owned()),
    ]
    .into_iter()
    .collect()
}

fn bootstrap(store: ConfigStore, entries: Vec<NativeEntry>) -> Bootstrap {
    let mut registry = NativeRegistry::new();
    for entry in entries {
        registry.register(entry);
    }
    Bootstrap::new(
        store,
        EntryResolver::new(registry.into_handle()),
        Dispatcher::default(),
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_lib_still_resolves_from_parent() {
    let home = home();
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let entry = NativeEntry::new("shop.Main").with_main(move |_| {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    });

    let outcome = bootstrap(store(home.path(), "shop.Main"), vec![entry])
        .run(&[])
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Completed);
    assert!(ran.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread")]
async fn unset_prefix_fails_before_touching_home() {
    let store: ConfigStore = [("shop.home", "/does/not/exist"), ("shop.init", "shop.Main")]
        .into_iter()
        .collect();

    let result = bootstrap(store, Vec::new()).run(&[]).await;
    assert!(matches!(
        result,
        Err(LoaderError::Configuration(ConfigError::MissingKey { key })) if key == "boot.prefix"
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_init_type_is_not_found() {
    let home = home();
    let result = bootstrap(store(home.path(), "shop.Ghost"), Vec::new())
        .run(&[])
        .await;
    assert!(matches!(
        result,
        Err(LoaderError::EntryNotFound { name }) if name == "shop.Ghost"
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn active_task_is_built_with_prefix_and_awaited() {
    let home = home();
    let finished = Arc::new(Mutex::new(None::<String>));
    let finished_in = Arc::clone(&finished);
    let entry = NativeEntry::new("shop.Server").with_task(move |prefix| {
        let prefix = prefix.to_owned();
        let finished = Arc::clone(&finished_in);
        Ok(move || {
            std::thread::sleep(Duration::from_millis(100));
            *finished.lock().unwrap() = Some(prefix);
        })
    });

    let outcome = bootstrap(store(home.path(), "shop.Server"), vec![entry])
        .run(&[])
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Completed);
    assert_eq!(finished.lock().unwrap().as_deref(), Some("shop"));
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_callable_does_not_abort_the_run() {
    let home = home();
    let entry = NativeEntry::new("shop.Job").with_callable(|| {
        Ok(|| -> anyhow::Result<EntryValue> { anyhow::bail!("job failed") })
    });

    let outcome = bootstrap(store(home.path(), "shop.Job"), vec![entry])
        .run(&[])
        .await
        .unwrap();

    assert!(matches!(outcome, DispatchOutcome::EntryFailed(ref m) if m.contains("job failed")));
}

#[tokio::test(flavor = "multi_thread")]
async fn active_task_preferred_over_runnable() {
    let home = home();
    let which = Arc::new(Mutex::new(Vec::new()));
    let (task_log, run_log) = (Arc::clone(&which), Arc::clone(&which));
    let entry = NativeEntry::new("shop.Both")
        .with_task(move |_| {
            let log = Arc::clone(&task_log);
            Ok(move || log.lock().unwrap().push("task"))
        })
        .with_runnable(move || {
            let log = Arc::clone(&run_log);
            Ok(move || log.lock().unwrap().push("run"))
        });

    bootstrap(store(home.path(), "shop.Both"), vec![entry])
        .run(&[])
        .await
        .unwrap();

    assert_eq!(*which.lock().unwrap(), vec!["task"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn args_are_published_and_forwarded() {
    let home = home();
    let received = Arc::new(Mutex::new(Vec::new()));
    let received_in = Arc::clone(&received);
    let entry = NativeEntry::new("shop.Main").with_main(move |args| {
        received_in.lock().unwrap().extend_from_slice(args);
        Ok(())
    });
    let args = vec!["a".to_owned(), "b".to_owned()];

    let mut run = bootstrap(store(home.path(), "shop.Main"), vec![entry]);
    run.run(&args).await.unwrap();

    assert_eq!(run.store().get("shop.init.arg0"), Some("a"));
    assert_eq!(run.store().get("shop.init.arg1"), Some("b"));
    assert!(!run.store().contains_key("shop.init.arg2"));
    assert_eq!(*received.lock().unwrap(), args);
}

#[tokio::test(flavor = "multi_thread")]
async fn cancellation_interrupts_the_wait() {
    let home = home();
    let release = Arc::new(AtomicBool::new(false));
    let release_in = Arc::clone(&release);
    let entry = NativeEntry::new("shop.Daemon").with_runnable(move || {
        let release = Arc::clone(&release_in);
        Ok(move || {
            while !release.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(5));
            }
        })
    });

    let cancel = CancellationToken::new();
    let mut registry = NativeRegistry::new();
    registry.register(entry);
    let mut run = Bootstrap::new(
        store(home.path(), "shop.Daemon"),
        EntryResolver::new(registry.into_handle()),
        Dispatcher::new(cancel.clone()),
    );

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });

    let outcome = run.run(&[]).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Interrupted);
    release.store(true, Ordering::SeqCst);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_lib_directory_is_configuration_error() {
    let home = tempfile::tempdir().unwrap();
    let result = bootstrap(store(home.path(), "shop.Main"), Vec::new())
        .run(&[])
        .await;
    assert!(matches!(
        result,
        Err(LoaderError::Configuration(ConfigError::InvalidPath { .. }))
    ));
}
