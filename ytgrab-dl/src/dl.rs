//! yt-dlp Python API wrappers.
//!
//! Type-safe bindings to [yt-dlp](https://github.com/yt-dlp/yt-dlp) `YoutubeDL` parameters, plus
//! Rust progress hooks exposed to yt-dlp as Python callables.
//!
//! ```no_run
//! use ytgrab_dl::dl::Downloader;
//! use ytgrab_dl::format::QualityIntent;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let info = Downloader::new(QualityIntent::AudioOnly.into())
//!     .progress_hook(|event| println!("{:?}", event.status))
//!     .extract_info("https://youtube.com/watch?v=example", true)?;
//! println!("Downloaded: {:?}", info.title);
//! # Ok(())
//! # }
//! ```

use crate::error::Error;
use crate::progress::{ProgressEvent, ProgressStatus};
use pyo3::exceptions::{PyImportError, PyTypeError};
use pyo3::ffi::c_str;
use pyo3::prelude::*;
use pyo3::types::{PyCFunction, PyDict, PyTuple};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pyo3::import_exception!(yt_dlp.utils, DownloadError);

/// Filename templates using `%(field)s` syntax. Key `default` required.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct OutputTemplates(pub Option<HashMap<String, String>>);

impl OutputTemplates {
    /// Create with a single default template.
    pub fn simple(default: String) -> Self {
        Self(Some(HashMap::from([("default".to_string(), default)])))
    }
}

/// Download directories keyed by type; `home` is the base directory.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct OutputPaths(pub Option<HashMap<String, String>>);

impl OutputPaths {
    /// Create with only the home directory set.
    pub fn home(home: &Path) -> Self {
        Self::default().with_home(home)
    }

    pub fn with_home(self, home: &Path) -> Self {
        let mut inner = self.0.unwrap_or_default();
        inner.insert("home".to_string(), home.to_string_lossy().to_string());
        Self(Some(inner))
    }
}

/// Post-download operation: `key` (e.g., `"FFmpegExtractAudio"`) with optional codec and quality.
#[derive(Clone, Debug, Default, PartialEq, Eq, IntoPyObject)]
pub struct PostProcessor {
    pub key: String,
    pub preferredcodec: Option<String>,
    pub preferredquality: Option<String>,
}

/// yt-dlp download configuration passed to `YoutubeDL(params)`.
///
/// `None` fields are left out of the params dict.
#[derive(Clone, Debug, Default, IntoPyObject)]
pub struct DownloadOptions {
    pub format: Option<String>,
    pub outtmpl: Option<OutputTemplates>,
    pub paths: Option<OutputPaths>,
    pub postprocessors: Option<Vec<PostProcessor>>,
    pub quiet: Option<bool>,
    pub no_warnings: Option<bool>,
    pub continuedl: Option<bool>,
    pub retries: Option<u32>,
    pub fragment_retries: Option<u32>,
    pub noplaylist: Option<bool>,
    pub listformats: Option<bool>,
    pub simulate: Option<bool>,
}

/// Essential metadata from the sanitized yt-dlp info dict.
///
/// Extracted via `FromPyObject`; keys yt-dlp leaves out read as `None`.
#[derive(Clone, Debug, Default, PartialEq, FromPyObject)]
#[pyo3(from_item_all)]
pub struct DownloadInfo {
    /// Video or playlist identifier
    #[pyo3(default)]
    pub id: Option<String>,
    /// Video or playlist title
    #[pyo3(default)]
    pub title: Option<String>,
    /// Length of the video in seconds
    #[pyo3(default)]
    pub duration: Option<f64>,
    /// Playlist items; `None` for a single video
    #[pyo3(default)]
    pub entries: Option<Vec<Option<DownloadInfo>>>,
}

impl DownloadInfo {
    /// Drop playlist items yt-dlp could not resolve (reported as `None`).
    fn without_unavailable(mut self) -> Self {
        self.entries = self.entries.map(|entries| {
            entries
                .into_iter()
                .flatten()
                .map(|entry| Some(entry.without_unavailable()))
                .collect()
        });
        self
    }
}

/// Callback invoked for every yt-dlp progress tick.
pub type ProgressHook = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// A configured `YoutubeDL` instance with registered progress hooks.
pub struct Downloader {
    options: DownloadOptions,
    hooks: Vec<ProgressHook>,
}

impl Downloader {
    pub fn new(options: DownloadOptions) -> Self {
        Self {
            options,
            hooks: Vec::new(),
        }
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// Register a progress hook. Hooks run on yt-dlp's thread, in registration order.
    pub fn progress_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Run `extract_info(url, download=download)` and return the sanitized info dict.
    ///
    /// `DownloadError` maps to [`Error::Download`]; every other exception to
    /// [`Error::Unexpected`].
    pub fn extract_info(&self, url: &str, download: bool) -> Result<DownloadInfo, Error> {
        tracing::debug!(
            url,
            download,
            format = ?self.options.format,
            hooks = self.hooks.len(),
            "calling yt-dlp"
        );

        Python::attach(|py| {
            self.extract_info_py(py, url, download)
                .map_err(|err| classify(py, err))
        })
    }

    fn extract_info_py(&self, py: Python<'_>, url: &str, download: bool) -> PyResult<DownloadInfo> {
        let module = PyModule::from_code(py, c_str!(include_str!("./dl.py")), c"dl.py", c"dl")?;

        let params = self.options.clone().into_pyobject(py)?;

        let hooks = self
            .hooks
            .iter()
            .map(|hook| progress_callback(py, Arc::clone(hook)))
            .collect::<PyResult<Vec<_>>>()?;

        let info = module
            .getattr("extract_info")?
            .call1((url, params, hooks, download))?;

        parse_info(&info, url)
    }
}

/// Check that the `yt_dlp` module can be imported.
pub fn ensure_installed() -> Result<(), Error> {
    Python::attach(|py| match py.import("yt_dlp") {
        Ok(module) => {
            tracing::debug!(module = %module, "found yt-dlp");
            Ok(())
        }
        Err(err) if err.is_instance_of::<PyImportError>(py) => Err(Error::MissingDependency(err)),
        Err(err) => Err(unexpected(py, err)),
    })
}

/// `extract_info` result; `None` means yt-dlp produced nothing for the URL.
fn parse_info(info: &Bound<'_, PyAny>, url: &str) -> PyResult<DownloadInfo> {
    if info.is_none() {
        return Err(PyTypeError::new_err(format!(
            "yt-dlp returned no info for {url}"
        )));
    }

    Ok(info.extract::<DownloadInfo>()?.without_unavailable())
}

/// Sort a Python exception into the download / unexpected buckets.
///
/// Resolving `DownloadError` imports `yt_dlp.utils`, so only call this once yt-dlp has loaded.
fn classify(py: Python<'_>, err: PyErr) -> Error {
    if !err.is_instance_of::<PyImportError>(py) && err.is_instance_of::<DownloadError>(py) {
        return Error::Download(err.value(py).to_string());
    }

    unexpected(py, err)
}

fn unexpected(py: Python<'_>, err: PyErr) -> Error {
    let kind = err
        .get_type(py)
        .name()
        .map(|name| name.to_string())
        .unwrap_or_else(|_| "Exception".to_string());

    Error::Unexpected {
        kind,
        message: err.value(py).to_string(),
    }
}

/// Wrap a hook as a Python callable taking yt-dlp's status dict.
///
/// Never raises into yt-dlp: unreadable events are logged and skipped.
fn progress_callback(py: Python<'_>, hook: ProgressHook) -> PyResult<Bound<'_, PyCFunction>> {
    PyCFunction::new_closure(
        py,
        None,
        None,
        move |args: &Bound<'_, PyTuple>, _kwargs: Option<&Bound<'_, PyDict>>| -> PyResult<()> {
            match args.get_item(0).and_then(|status| progress_event(&status)) {
                Ok(event) => hook(&event),
                Err(err) => tracing::debug!(%err, "skipping unreadable progress event"),
            }
            Ok(())
        },
    )
}

/// The subset of yt-dlp's progress dict the reporter reads. Every key is optional.
#[derive(Debug, FromPyObject)]
struct ProgressDict {
    #[pyo3(item, default)]
    status: Option<String>,
    #[pyo3(item("_percent_str"), default)]
    percent: Option<String>,
    #[pyo3(item("_speed_str"), default)]
    speed: Option<String>,
    #[pyo3(item("_eta_str"), default)]
    eta: Option<String>,
    /// Byte counters may be int or float (`total_bytes_estimated`)
    #[pyo3(item, default)]
    downloaded_bytes: Option<f64>,
    #[pyo3(item, default)]
    total_bytes: Option<f64>,
    #[pyo3(item, default)]
    total_bytes_estimated: Option<f64>,
}

impl From<ProgressDict> for ProgressEvent {
    fn from(dict: ProgressDict) -> Self {
        Self {
            status: ProgressStatus::from(dict.status.as_deref().unwrap_or_default()),
            percent: dict.percent,
            speed: dict.speed,
            eta: dict.eta,
            downloaded_bytes: dict.downloaded_bytes,
            total_bytes: dict.total_bytes,
            total_bytes_estimated: dict.total_bytes_estimated,
        }
    }
}

fn progress_event(status: &Bound<'_, PyAny>) -> PyResult<ProgressEvent> {
    let dict: Bound<'_, PyDict> = status.extract()?;
    Ok(dict.extract::<ProgressDict>()?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::QualityIntent;
    use crate::progress::status_line;
    use pyo3::exceptions::PyValueError;
    use pyo3::types::PyAnyMethods;
    use std::ffi::CStr;
    use std::sync::Mutex;

    /// Compare Python object with dict/list literal using recursive equality.
    #[track_caller]
    fn assert_py_eq(py: Python, py_obj: &Bound<PyAny>, expected: &'static CStr) {
        let py_expected = py.eval(expected, None, None).unwrap();
        assert!(py_obj.eq(&py_expected).unwrap());
    }

    fn eval_dict<'py>(py: Python<'py>, code: &'static CStr) -> Bound<'py, PyDict> {
        py.eval(code, None, None).unwrap().extract().unwrap()
    }

    #[test]
    fn output_templates_simple() {
        Python::attach(|py| {
            let templates = OutputTemplates::simple("%(title)s [%(id)s].%(ext)s".to_string());
            let py_obj = templates.into_pyobject(py).unwrap();
            assert_py_eq(py, py_obj.as_any(), c"{'default': '%(title)s [%(id)s].%(ext)s'}");
        });
    }

    #[test]
    fn output_paths_home() {
        Python::attach(|py| {
            let paths = OutputPaths::home(Path::new("/tmp/videos"));
            let py_obj = paths.into_pyobject(py).unwrap();
            assert_py_eq(py, py_obj.as_any(), c"{'home': '/tmp/videos'}");
        });
    }

    #[test]
    fn postprocessor() {
        Python::attach(|py| {
            let processor = PostProcessor {
                key: "FFmpegExtractAudio".to_string(),
                preferredcodec: Some("m4a".to_string()),
                preferredquality: Some("192".to_string()),
            };
            let py_obj = processor.into_pyobject(py).unwrap();
            assert_py_eq(
                py,
                py_obj.as_any(),
                c"{'key': 'FFmpegExtractAudio', 'preferredcodec': 'm4a', 'preferredquality': '192'}",
            );
        });
    }

    #[test]
    fn dl_options_from_intent() {
        Python::attach(|py| {
            let opts: DownloadOptions = QualityIntent::HeightCapped(720).into();
            let py_obj = opts.into_pyobject(py).unwrap();
            assert_py_eq(
                py,
                py_obj.as_any(),
                c"{'format': 'bestvideo[height<=720]+bestaudio/best[height<=720]', 'outtmpl': None, 'paths': None, 'postprocessors': None, 'quiet': False, 'no_warnings': True, 'continuedl': True, 'retries': 10, 'fragment_retries': 10, 'noplaylist': None, 'listformats': None, 'simulate': None}",
            );
        });
    }

    #[test]
    fn progress_event_from_dict() {
        Python::attach(|py| {
            let dict = eval_dict(
                py,
                c"{'status': 'downloading', '_percent_str': '50.0%', '_speed_str': '1.2MiB/s', '_eta_str': '10s', 'downloaded_bytes': 500, 'total_bytes': None, 'total_bytes_estimated': 1000.7}",
            );
            let event = progress_event(dict.as_any()).unwrap();

            assert_eq!(
                event,
                ProgressEvent {
                    status: ProgressStatus::Downloading,
                    percent: Some("50.0%".to_string()),
                    speed: Some("1.2MiB/s".to_string()),
                    eta: Some("10s".to_string()),
                    downloaded_bytes: Some(500.0),
                    total_bytes: None,
                    total_bytes_estimated: Some(1000.7),
                }
            );
        });
    }

    #[test]
    fn progress_event_keeps_fractional_estimate() {
        Python::attach(|py| {
            let dict = eval_dict(
                py,
                c"{'status': 'downloading', 'downloaded_bytes': 10, 'total_bytes_estimated': 1000.7}",
            );
            let event = progress_event(dict.as_any()).unwrap();

            assert_eq!(
                status_line(&event).as_deref(),
                Some("?%  10.0B / 1000.7B  ? B/s  ETA ?s")
            );
        });
    }

    #[test]
    fn progress_event_missing_keys() {
        Python::attach(|py| {
            let dict = eval_dict(py, c"{'status': 'error'}");
            let event = progress_event(dict.as_any()).unwrap();
            assert_eq!(event, ProgressEvent::new(ProgressStatus::Other("error".to_string())));

            let empty = eval_dict(py, c"{}");
            let event = progress_event(empty.as_any()).unwrap();
            assert_eq!(event, ProgressEvent::new(ProgressStatus::Other(String::new())));
        });
    }

    #[test]
    fn progress_callback_forwards_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hook: ProgressHook = Arc::new(move |event: &ProgressEvent| {
            sink.lock().unwrap().push(event.clone());
        });

        Python::attach(|py| {
            let callback = progress_callback(py, hook).unwrap();

            let finished = eval_dict(py, c"{'status': 'finished', 'filename': 'a.mp4'}");
            let result = callback.call1((finished,)).unwrap();
            assert!(result.is_none());

            // not a dict: skipped without raising
            assert!(callback.call1((42,)).unwrap().is_none());
            // wrong value type: skipped without raising
            let bad = eval_dict(py, c"{'status': 'downloading', 'downloaded_bytes': 'many'}");
            assert!(callback.call1((bad,)).unwrap().is_none());
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].status, ProgressStatus::Finished);
    }

    #[test]
    fn download_info_single_video() {
        Python::attach(|py| {
            let dict = eval_dict(
                py,
                c"{'id': 'jNQXAC9IVRw', 'title': 'Me at the zoo', 'duration': 19, 'ext': 'mp4'}",
            );
            let info = parse_info(dict.as_any(), "https://youtu.be/jNQXAC9IVRw").unwrap();

            assert_eq!(
                info,
                DownloadInfo {
                    id: Some("jNQXAC9IVRw".to_string()),
                    title: Some("Me at the zoo".to_string()),
                    duration: Some(19.0),
                    entries: None,
                }
            );
        });
    }

    #[test]
    fn download_info_playlist_skips_unavailable() {
        Python::attach(|py| {
            let dict = eval_dict(
                py,
                c"{'id': 'PL1', 'title': 'Mix', 'entries': [{'id': 'a', 'title': 'A'}, None, {'id': 'b'}]}",
            );
            let info = parse_info(dict.as_any(), "https://youtube.com/playlist?list=PL1").unwrap();
            let entries = info.entries.expect("playlist entries");

            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].as_ref().unwrap().title.as_deref(), Some("A"));
            assert_eq!(entries[1].as_ref().unwrap().title, None);
        });
    }

    #[test]
    fn no_info_is_an_error() {
        Python::attach(|py| {
            let none = py.eval(c"None", None, None).unwrap();
            let err = parse_info(&none, "https://youtu.be/x").unwrap_err();

            assert!(err.is_instance_of::<PyTypeError>(py));
            assert!(matches!(
                unexpected(py, err),
                Error::Unexpected { kind, message }
                    if kind == "TypeError" && message == "yt-dlp returned no info for https://youtu.be/x"
            ));
        });
    }

    #[test]
    fn import_error_is_unexpected() {
        Python::attach(|py| {
            let err = PyImportError::new_err("No module named 'ffmpeg'");
            assert!(matches!(
                classify(py, err),
                Error::Unexpected { kind, .. } if kind == "ImportError"
            ));
        });
    }

    #[test]
    #[ignore = "requires yt-dlp"]
    fn classify_download_error() {
        Python::attach(|py| {
            let err = DownloadError::new_err("ERROR: Video unavailable");
            assert!(matches!(
                classify(py, err),
                Error::Download(message) if message == "ERROR: Video unavailable"
            ));
        });
    }

    #[test]
    #[ignore = "requires yt-dlp"]
    fn classify_unexpected() {
        Python::attach(|py| {
            let err = PyValueError::new_err("boom");
            assert!(matches!(
                classify(py, err),
                Error::Unexpected { kind, message } if kind == "ValueError" && message == "boom"
            ));
        });
    }

    #[test]
    #[ignore = "requires yt-dlp"]
    fn yt_dlp_is_installed() {
        assert!(ensure_installed().is_ok());
    }

    #[test]
    fn downloader_keeps_options() {
        let downloader = Downloader::new(QualityIntent::BestVideo.into()).progress_hook(|_| {});
        assert_eq!(downloader.options().format.as_deref(), Some("bestvideo"));
        assert_eq!(downloader.hooks.len(), 1);
    }
}
