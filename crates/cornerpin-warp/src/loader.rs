//! Single-shot image loading.
//!
//! A load resolves exactly once, to an image or an error. Object construction
//! waits for that result; a failed load constructs nothing.

use std::path::PathBuf;

use crate::error::WarpError;
use crate::object::WarpObject;
use crate::persist::WarpRecord;
use crate::source::SourceImage;

type LoadResult = Result<SourceImage, WarpError>;

/// Fetches images by source string.
pub trait ImageLoader {
    fn load(&self, src: &str, cross_origin: &str) -> LoadTask;
}

impl<F> ImageLoader for F
where
    F: Fn(&str, &str) -> LoadResult,
{
    fn load(&self, src: &str, cross_origin: &str) -> LoadTask {
        LoadTask::ready(src, self(src, cross_origin))
    }
}

/// Handle to an in-flight image load.
pub struct LoadTask {
    src: String,
    rx: oneshot::Receiver<LoadResult>,
}

impl LoadTask {
    /// Runs `job` on a worker thread.
    pub fn spawn<F>(src: &str, job: F) -> Self
    where
        F: FnOnce() -> LoadResult + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let name = format!("load {src}");
        let spawned = std::thread::Builder::new().name(name).spawn(move || {
            // The receiver may be gone if the caller gave up.
            let _ = tx.send(job());
        });

        if let Err(e) = spawned {
            return Self::ready(src, Err(WarpError::image_load(src, format!("worker thread: {e}"))));
        }

        Self { src: src.to_string(), rx }
    }

    /// A task that has already resolved.
    pub fn ready(src: &str, result: LoadResult) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { src: src.to_string(), rx }
    }

    #[inline]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Non-blocking check. `None` while the load is still running.
    pub fn try_take(&self) -> Option<LoadResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::TryRecvError::Empty) => None,
            Err(oneshot::TryRecvError::Disconnected) => {
                Some(Err(WarpError::image_load(&self.src, "loader dropped without a result")))
            }
        }
    }

    /// Blocks until the load resolves.
    pub fn wait(self) -> LoadResult {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(WarpError::image_load(&self.src, "loader dropped without a result")))
    }
}

/// Loads images from the local filesystem on a worker thread.
///
/// Relative sources resolve against `root` when set.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    pub root: Option<PathBuf>,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    fn resolve(&self, src: &str) -> PathBuf {
        let path = PathBuf::from(src.strip_prefix("file://").unwrap_or(src));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

impl ImageLoader for FileLoader {
    fn load(&self, src: &str, cross_origin: &str) -> LoadTask {
        log::debug!("loading {src} (crossOrigin={cross_origin}; not applicable to local files)");
        let path = self.resolve(src);
        let src_owned = src.to_string();

        LoadTask::spawn(src, move || {
            let bytes = std::fs::read(&path).map_err(|e| WarpError::image_load(&src_owned, e))?;
            SourceImage::decode(src_owned, &bytes)
        })
    }
}

/// An object waiting for its image.
pub struct PendingWarp {
    task: Option<LoadTask>,
    record: WarpRecord,
}

impl PendingWarp {
    pub(crate) fn new(task: LoadTask, record: WarpRecord) -> Self {
        Self { task: Some(task), record }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.task.is_none()
    }

    #[inline]
    pub fn record(&self) -> &WarpRecord {
        &self.record
    }

    /// Yields the outcome exactly once, `None` before the image resolves and
    /// after the outcome has been taken.
    pub fn poll(&mut self) -> Option<Result<WarpObject, WarpError>> {
        let result = self.task.as_ref()?.try_take()?;
        self.task = None;
        Some(self.finish(result))
    }

    /// Blocks until the image resolves and builds the object.
    pub fn wait(mut self) -> Result<WarpObject, WarpError> {
        let Some(task) = self.task.take() else {
            return Err(WarpError::image_load(self.record.src.as_deref().unwrap_or_default(), "already completed"));
        };
        let result = task.wait();
        self.finish(result)
    }

    fn finish(&self, image: Result<SourceImage, WarpError>) -> Result<WarpObject, WarpError> {
        let image = image.inspect_err(|e| log::error!("warp object not restored: {e}"))?;

        let (options, passthrough) = self.record.to_options()?;
        let mut object = WarpObject::new(image, options)?;
        object.set_passthrough(passthrough);

        log::info!("restored warp object from {}", object.image().src());
        Ok(object)
    }
}
