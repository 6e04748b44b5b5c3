//! One pass over the watch folder.
//!
//! Provisions the state directories, loads credentials, picks one video,
//! queues it, authorizes, and hands it to the upload driver. Every step
//! receives what it needs from the step before; nothing is shared.

use anyhow::{Context, Result};
use std::path::Path;
use tubedrop_lib::prelude::*;

/// How a run ended, when it did not fail.
#[derive(Debug)]
pub(crate) enum RunOutcome {
    /// The watch folder held no video file.
    NoFiles,
    /// A file was uploaded and moved to `done`.
    Uploaded(UploadReport),
}

/// Processes at most one file from `root`.
pub(crate) async fn run_once<A, U>(
    root: &WatchRoot,
    credentials_path: &Path,
    authorizer: &A,
    driver: &UploadDriver<U>,
) -> Result<RunOutcome>
where
    A: Authorizer + ?Sized,
    U: ResumableUpload,
{
    root.bootstrap();

    let credentials = load_credentials(credentials_path)
        .await
        .context("Failed to load credentials")?;

    let name = match root.scan() {
        Ok(name) => name,
        Err(e) if e.is_no_files() => {
            tracing::info!(root = %root.path().display(), reason = %e, "nothing to upload");
            return Ok(RunOutcome::NoFiles);
        }
        Err(e) => return Err(e).context("Failed to scan watch folder"),
    };

    let queued = root
        .enqueue(&name)
        .with_context(|| format!("Failed to queue {name}"))?;
    tracing::info!(file = %queued.display(), "queued");

    let token = authorizer
        .authorize(&credentials, &[YOUTUBE_UPLOAD_SCOPE])
        .await
        .inspect_err(|e| tracing::error!(error = %e, file = %name, "Could not authenticate"))
        .context("Could not authenticate")?;

    let report = driver
        .run(&token, &name)
        .await
        .with_context(|| format!("Failed to upload {name}"))?;

    Ok(RunOutcome::Uploaded(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct RecordingAuthorizer {
        fail: bool,
        calls: Mutex<Vec<(Credentials, Vec<String>)>>,
    }

    #[async_trait]
    impl Authorizer for RecordingAuthorizer {
        async fn authorize(
            &self,
            credentials: &Credentials,
            scopes: &[&str],
        ) -> Result<AccessToken, AuthError> {
            self.calls.lock().unwrap().push((
                credentials.clone(),
                scopes.iter().map(|s| (*s).to_string()).collect(),
            ));
            if self.fail {
                Err(AuthError::Denied("access_denied".to_string()))
            } else {
                Ok(AccessToken::new("tok"))
            }
        }
    }

    #[derive(Debug, Default)]
    struct CountingUpload {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ResumableUpload for CountingUpload {
        async fn upload(
            &self,
            _token: &AccessToken,
            _path: &Path,
            _metadata: &VideoMetadata,
            _max_retries: u32,
            progress: &mut (dyn FnMut(u64) + Send),
        ) -> Result<UploadedVideo, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            progress(500);
            progress(1000);
            if self.fail {
                Err(UploadError::Malformed("network".to_string()))
            } else {
                Ok(UploadedVideo {
                    id: "vid".to_string(),
                })
            }
        }
    }

    struct Fixture {
        _temp_dir: TempDir,
        root: WatchRoot,
        credentials: std::path::PathBuf,
    }

    fn fixture(files: &[&str]) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let root = WatchRoot::new(temp_dir.path().join("watchfolder"));
        std::fs::create_dir(root.path()).unwrap();
        for name in files {
            std::fs::write(root.path().join(name), vec![0u8; 1000]).unwrap();
        }

        let credentials = temp_dir.path().join("credentials.json");
        std::fs::write(
            &credentials,
            r#"{"name":"n","client_id":"c","client_secret":"s"}"#,
        )
        .unwrap();

        Fixture {
            _temp_dir: temp_dir,
            root,
            credentials,
        }
    }

    fn driver(root: &WatchRoot, fail: bool) -> UploadDriver<CountingUpload> {
        UploadDriver::new(
            root.clone(),
            CountingUpload {
                fail,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_authorizer_gets_credentials_and_scope() {
        let f = fixture(&["clip.mp4"]);
        let authorizer = RecordingAuthorizer::default();

        run_once(&f.root, &f.credentials, &authorizer, &driver(&f.root, false))
            .await
            .unwrap();

        let calls = authorizer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Credentials::new("n", "c", "s"));
        assert_eq!(calls[0].1, [YOUTUBE_UPLOAD_SCOPE]);
    }

    #[tokio::test]
    async fn test_authorization_error_aborts_before_upload() {
        let f = fixture(&["clip.mp4"]);
        let authorizer = RecordingAuthorizer {
            fail: true,
            ..Default::default()
        };
        let driver = driver(&f.root, false);

        let result = run_once(&f.root, &f.credentials, &authorizer, &driver).await;

        assert!(result.is_err());
        assert_eq!(driver.uploader().calls.load(Ordering::SeqCst), 0);
        assert!(f.root.contains(StateDir::Queue, "clip.mp4"));
        assert!(!f.root.contains(StateDir::InProgress, "clip.mp4"));
    }

    #[tokio::test]
    async fn test_success_lands_in_done() {
        let f = fixture(&["clip.mp4"]);

        let outcome = run_once(
            &f.root,
            &f.credentials,
            &RecordingAuthorizer::default(),
            &driver(&f.root, false),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, RunOutcome::Uploaded(ref r) if r.video.id == "vid"));
        assert!(f.root.contains(StateDir::Done, "clip.mp4"));
        assert!(!f.root.contains(StateDir::Failed, "clip.mp4"));
        assert!(!f.root.contains(StateDir::Queue, "clip.mp4"));
    }

    #[tokio::test]
    async fn test_upload_error_lands_in_failed() {
        let f = fixture(&["clip.mp4"]);

        let result = run_once(
            &f.root,
            &f.credentials,
            &RecordingAuthorizer::default(),
            &driver(&f.root, true),
        )
        .await;

        assert!(result.is_err());
        assert!(f.root.contains(StateDir::Failed, "clip.mp4"));
        assert!(!f.root.contains(StateDir::Queue, "clip.mp4"));
        assert!(!f.root.contains(StateDir::Done, "clip.mp4"));
    }

    #[tokio::test]
    async fn test_no_video_ends_quietly() {
        let f = fixture(&["notes.txt"]);
        let authorizer = RecordingAuthorizer::default();

        let outcome = run_once(&f.root, &f.credentials, &authorizer, &driver(&f.root, false))
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::NoFiles));
        assert!(authorizer.calls.lock().unwrap().is_empty());
        for state in StateDir::PROVISIONED {
            assert!(state.path_in(f.root.path()).is_dir());
        }
    }

    #[tokio::test]
    async fn test_bad_credentials_abort_before_scan() {
        let f = fixture(&["clip.mp4"]);
        std::fs::write(&f.credentials, "{").unwrap();
        let authorizer = RecordingAuthorizer::default();

        let result = run_once(&f.root, &f.credentials, &authorizer, &driver(&f.root, false)).await;

        assert!(result.is_err());
        assert!(f.root.contains(StateDir::Root, "clip.mp4"));
        assert!(authorizer.calls.lock().unwrap().is_empty());
    }
}
