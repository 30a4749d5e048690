use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use crate::AssetError;
use crate::texture::TextureImage;
use crate::typeface::Typeface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Font,
    Texture,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Font => f.write_str("font"),
            Self::Texture => f.write_str("texture"),
        }
    }
}

/// A decoded asset ready for the main thread.
#[derive(Debug)]
pub enum LoadedAsset {
    Font(Typeface),
    Texture(TextureImage),
}

/// Completion record for one load request.
#[derive(Debug)]
pub enum LoadEvent {
    Loaded { path: PathBuf, asset: LoadedAsset },
    Failed {
        path: PathBuf,
        kind: AssetKind,
        error: AssetError,
    },
}

/// Background asset loader.
///
/// Each request runs on its own thread and reports back through a channel.
/// Nothing blocks the caller: drain finished loads with [`AssetLoader::poll`]
/// once per frame. Completion order is whatever order the reads finish in.
/// Requests cannot be cancelled and have no timeout.
pub struct AssetLoader {
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
    in_flight: usize,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn load_font(&mut self, path: impl Into<PathBuf>) {
        self.spawn(AssetKind::Font, path.into());
    }

    pub fn load_texture(&mut self, path: impl Into<PathBuf>) {
        self.spawn(AssetKind::Texture, path.into());
    }

    fn spawn(&mut self, kind: AssetKind, path: PathBuf) {
        tracing::debug!("loading {kind} from {}", path.display());
        self.in_flight += 1;
        let tx = self.tx.clone();
        let thread_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("load-{kind}"))
            .spawn(move || {
                let _ = tx.send(read(kind, thread_path));
            });
        if let Err(error) = spawned {
            let _ = self.tx.send(LoadEvent::Failed {
                path,
                kind,
                error: AssetError::Io(error),
            });
        }
    }

    /// Drain every load that has finished since the last call.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    events.push(event);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Block for the next finished load, up to `timeout`.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(event)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Requests issued but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

fn read(kind: AssetKind, path: PathBuf) -> LoadEvent {
    let result = match kind {
        AssetKind::Font => Typeface::load(&path).map(LoadedAsset::Font),
        AssetKind::Texture => TextureImage::load(&path).map(LoadedAsset::Texture),
    };
    match result {
        Ok(asset) => LoadEvent::Loaded { path, asset },
        Err(error) => LoadEvent::Failed { path, kind, error },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeface::tests::TEST_FACE;

    const WAIT: Duration = Duration::from_secs(10);

    #[test]
    fn loads_font_in_background() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), TEST_FACE).unwrap();

        let mut loader = AssetLoader::new();
        loader.load_font(tmp.path());
        assert_eq!(loader.in_flight(), 1);

        match loader.wait(WAIT) {
            Some(LoadEvent::Loaded {
                asset: LoadedAsset::Font(face),
                ..
            }) => assert_eq!(face.family_name, "Test Sans"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn missing_file_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AssetLoader::new();
        loader.load_texture(dir.path().join("missing.png"));

        match loader.wait(WAIT) {
            Some(LoadEvent::Failed { kind, error, .. }) => {
                assert_eq!(kind, AssetKind::Texture);
                assert!(matches!(error, AssetError::Io(_)));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn malformed_font_reports_json_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "{ not json").unwrap();
        let mut loader = AssetLoader::new();
        loader.load_font(tmp.path());
        assert!(matches!(
            loader.wait(WAIT),
            Some(LoadEvent::Failed {
                error: AssetError::Json(_),
                ..
            })
        ));
    }

    #[test]
    fn poll_never_blocks() {
        let mut loader = AssetLoader::new();
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn poll_drains_every_completion() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AssetLoader::new();
        loader.load_font(dir.path().join("a.json"));
        loader.load_font(dir.path().join("b.json"));

        let mut seen = Vec::new();
        while seen.len() < 2 {
            if let Some(event) = loader.wait(WAIT) {
                seen.push(event);
            } else {
                break;
            }
            seen.extend(loader.poll());
        }
        assert_eq!(seen.len(), 2);
        assert_eq!(loader.in_flight(), 0);
    }
}
