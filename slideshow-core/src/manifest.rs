use crate::error::{SlideshowError, SlideshowResult};
use crate::fetch::Fetcher;

const COMMENT_MARKER: char = '#';

/// Ordered segment references extracted from a playlist.
///
/// Only the degenerate playlist shape is understood: every line that is
/// neither empty nor a `#` comment names a segment relative to the
/// playlist's own directory. Tags are not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    url: String,
    base_url: String,
    segments: Vec<String>,
}

impl Manifest {
    pub fn parse(url: &str, contents: &str) -> SlideshowResult<Self> {
        let segments: Vec<String> = contents
            .trim()
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            return Err(SlideshowError::EmptyManifest {
                url: url.to_string(),
            });
        }
        Ok(Self {
            url: url.to_string(),
            base_url: base_url(url),
            segments,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<String> {
        self.segments
    }

    pub fn segment_url(&self, segment: &str) -> String {
        format!("{}{}", self.base_url, segment)
    }
}

/// Drops the final path component of `manifest_url`, keeping the trailing `/`.
pub fn base_url(manifest_url: &str) -> String {
    let directory = manifest_url
        .rsplit_once('/')
        .map(|(head, _)| head)
        .unwrap_or(manifest_url);
    format!("{directory}/")
}

pub async fn fetch_manifest<F>(fetcher: &F, url: &str) -> SlideshowResult<Manifest>
where
    F: Fetcher + ?Sized,
{
    let contents =
        fetcher
            .fetch_text(url)
            .await
            .map_err(|err| SlideshowError::ManifestFetch {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
    Manifest::parse(url, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://h/x/list.m3u8";

    #[test]
    fn keeps_segment_lines_in_order() {
        let manifest = Manifest::parse(
            URL,
            "#EXTM3U\n#EXTINF:10,\nseg1.jpg\n\n# comment with seg9.jpg\nseg2.jpg\nseg3.jpg\n",
        )
        .unwrap();
        assert_eq!(manifest.segments(), ["seg1.jpg", "seg2.jpg", "seg3.jpg"]);
    }

    #[test]
    fn comment_count_does_not_change_result() {
        let plain = Manifest::parse(URL, "a.jpg\nb.jpg").unwrap();
        let noisy = Manifest::parse(URL, "#x\n\n#y\na.jpg\n#z\n\n\nb.jpg\n#end\n").unwrap();
        assert_eq!(plain.segments(), noisy.segments());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let manifest = Manifest::parse(URL, "#EXTM3U\r\nseg1.jpg\r\nseg2.jpg\r\n").unwrap();
        assert_eq!(manifest.segments(), ["seg1.jpg", "seg2.jpg"]);
    }

    #[test]
    fn comment_only_playlist_is_empty() {
        let err = Manifest::parse(URL, "#EXTM3U\n#EXT-X-ENDLIST\n\n").unwrap_err();
        assert!(matches!(err, SlideshowError::EmptyManifest { url } if url == URL));

        let err = Manifest::parse(URL, "").unwrap_err();
        assert!(matches!(err, SlideshowError::EmptyManifest { .. }));
    }

    #[test]
    fn base_url_strips_last_component() {
        assert_eq!(base_url(URL), "http://h/x/");
        assert_eq!(base_url("http://h/list.m3u8"), "http://h/");
        assert_eq!(base_url("list.m3u8"), "list.m3u8/");
    }

    #[test]
    fn segment_url_is_prefix_concatenation() {
        let manifest = Manifest::parse(URL, "seg1.jpg\nimg/seg2.jpg\n").unwrap();
        assert_eq!(manifest.segment_url("seg1.jpg"), "http://h/x/seg1.jpg");
        assert_eq!(manifest.segment_url("img/seg2.jpg"), "http://h/x/img/seg2.jpg");
    }
}
