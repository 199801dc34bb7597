//! The search-provider port and its Pexels-backed implementation.
//!
//! The two Pexels endpoints return differently shaped documents (`photos`
//! vs `videos`, with distinct per-hit fields); both are normalized into the
//! uniform [`ResultItem`] here so nothing downstream knows which endpoint a
//! result came from.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::constants::constants;
use crate::error::PxError;
use crate::session::{MediaKind, Query, ResultItem, SearchCursor};

/// A source of search results. The controller talks to the provider through
/// this seam, so tests substitute a scripted implementation.
pub trait SearchProvider: Send + Sync + 'static {
  /// Fetch one page of results. An empty page is a valid outcome (zero
  /// matches), not an error.
  fn search(
    &self,
    query: &Query,
    cursor: &SearchCursor,
    credential: &str,
  ) -> impl Future<Output = Result<Vec<ResultItem>, PxError>> + Send;
}

// --- Pexels wire shapes ---
// Only the fields we consume are modeled; the rest of the payload is ignored.
// Everything optional is `default` so a sparse hit still normalizes.

#[derive(Debug, Deserialize)]
struct PhotoPage {
  #[serde(default)]
  photos: Vec<PhotoHit>,
}

#[derive(Debug, Deserialize)]
struct PhotoHit {
  id: u64,
  #[serde(default)]
  src: Option<PhotoSrc>,
  #[serde(default)]
  photographer: Option<String>,
  #[serde(default)]
  url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PhotoSrc {
  #[serde(default)]
  large: Option<String>,
  #[serde(default)]
  medium: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoPage {
  #[serde(default)]
  videos: Vec<VideoHit>,
}

#[derive(Debug, Deserialize)]
struct VideoHit {
  id: u64,
  #[serde(default)]
  image: Option<String>,
  #[serde(default)]
  video_pictures: Vec<VideoPicture>,
  #[serde(default)]
  user: Option<VideoUser>,
  #[serde(default)]
  url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoPicture {
  #[serde(default)]
  picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoUser {
  #[serde(default)]
  name: Option<String>,
}

// --- Normalization ---

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|s| !s.is_empty())
}

/// Thumbnail falls back `src.large` → `src.medium` → empty string.
fn normalize_photo(hit: PhotoHit) -> ResultItem {
  let src = hit.src.unwrap_or_default();
  ResultItem {
    id: format!("photo_{}", hit.id),
    media: MediaKind::Photo,
    thumb: non_empty(src.large).or(src.medium).unwrap_or_default(),
    author: non_empty(hit.photographer).unwrap_or_else(|| constants().unknown_author.clone()),
    link: hit.url.unwrap_or_default(),
  }
}

/// Thumbnail falls back `image` → `video_pictures[0].picture` → empty string.
fn normalize_video(hit: VideoHit) -> ResultItem {
  let fallback_picture = hit.video_pictures.into_iter().next().and_then(|p| p.picture);
  ResultItem {
    id: format!("video_{}", hit.id),
    media: MediaKind::Video,
    thumb: non_empty(hit.image).or(fallback_picture).unwrap_or_default(),
    author: hit.user.and_then(|u| non_empty(u.name)).unwrap_or_else(|| constants().unknown_author.clone()),
    link: hit.url.unwrap_or_default(),
  }
}

// --- Client ---

/// Pexels-backed [`SearchProvider`] over a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct PexelsClient {
  http: Client,
}

impl PexelsClient {
  pub fn new() -> Self {
    Self { http: Client::new() }
  }
}

impl SearchProvider for PexelsClient {
  async fn search(&self, query: &Query, cursor: &SearchCursor, credential: &str) -> Result<Vec<ResultItem>, PxError> {
    debug!(query = %query.text, media = query.media.label(), page = cursor.page, "provider request");

    let response = self
      .http
      .get(query.media.endpoint())
      .query(&[
        ("query", query.text.clone()),
        ("page", cursor.page.to_string()),
        ("per_page", cursor.per_page.to_string()),
      ])
      .header(AUTHORIZATION, credential)
      .send()
      .await
      .map_err(|e| PxError::Transport(e.to_string()))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
      return Err(PxError::Auth);
    }
    if !status.is_success() {
      return Err(PxError::Transport(format!("provider returned HTTP {status}")));
    }

    match query.media {
      MediaKind::Photo => {
        let page: PhotoPage = response.json().await.map_err(|e| PxError::Transport(e.to_string()))?;
        Ok(page.photos.into_iter().map(normalize_photo).collect())
      }
      MediaKind::Video => {
        let page: VideoPage = response.json().await.map_err(|e| PxError::Transport(e.to_string()))?;
        Ok(page.videos.into_iter().map(normalize_video).collect())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- Photo normalization ---

  #[test]
  fn photo_hit_with_all_fields() {
    let page: PhotoPage = serde_json::from_str(
      r#"{"photos":[{"id":101,"photographer":"Ada Lovelace","url":"https://www.pexels.com/photo/101/",
          "src":{"large":"https://img/large.jpg","medium":"https://img/medium.jpg"}}]}"#,
    )
    .unwrap();
    let items: Vec<ResultItem> = page.photos.into_iter().map(normalize_photo).collect();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "photo_101");
    assert_eq!(items[0].media, MediaKind::Photo);
    assert_eq!(items[0].thumb, "https://img/large.jpg");
    assert_eq!(items[0].author, "Ada Lovelace");
    assert_eq!(items[0].link, "https://www.pexels.com/photo/101/");
  }

  #[test]
  fn photo_thumb_falls_back_to_medium() {
    let page: PhotoPage =
      serde_json::from_str(r#"{"photos":[{"id":1,"src":{"medium":"https://img/medium.jpg"}}]}"#).unwrap();
    let item = page.photos.into_iter().map(normalize_photo).next().unwrap();
    assert_eq!(item.thumb, "https://img/medium.jpg");
  }

  #[test]
  fn photo_missing_optionals_fall_back_to_placeholders() {
    let page: PhotoPage = serde_json::from_str(r#"{"photos":[{"id":7}]}"#).unwrap();
    let item = page.photos.into_iter().map(normalize_photo).next().unwrap();
    assert_eq!(item.thumb, "");
    assert_eq!(item.author, constants().unknown_author);
    assert_eq!(item.link, "");
  }

  #[test]
  fn photo_empty_photographer_falls_back() {
    let page: PhotoPage = serde_json::from_str(r#"{"photos":[{"id":7,"photographer":""}]}"#).unwrap();
    let item = page.photos.into_iter().map(normalize_photo).next().unwrap();
    assert_eq!(item.author, constants().unknown_author);
  }

  // --- Video normalization ---

  #[test]
  fn video_hit_with_all_fields() {
    let page: VideoPage = serde_json::from_str(
      r#"{"videos":[{"id":202,"image":"https://img/poster.jpg","url":"https://www.pexels.com/video/202/",
          "user":{"name":"Grace Hopper"},"video_pictures":[{"picture":"https://img/frame0.jpg"}]}]}"#,
    )
    .unwrap();
    let item = page.videos.into_iter().map(normalize_video).next().unwrap();
    assert_eq!(item.id, "video_202");
    assert_eq!(item.media, MediaKind::Video);
    assert_eq!(item.thumb, "https://img/poster.jpg");
    assert_eq!(item.author, "Grace Hopper");
  }

  #[test]
  fn video_thumb_falls_back_to_first_picture() {
    let page: VideoPage =
      serde_json::from_str(r#"{"videos":[{"id":2,"video_pictures":[{"picture":"https://img/frame0.jpg"}]}]}"#).unwrap();
    let item = page.videos.into_iter().map(normalize_video).next().unwrap();
    assert_eq!(item.thumb, "https://img/frame0.jpg");
  }

  #[test]
  fn video_missing_optionals_fall_back_to_placeholders() {
    let page: VideoPage = serde_json::from_str(r#"{"videos":[{"id":2}]}"#).unwrap();
    let item = page.videos.into_iter().map(normalize_video).next().unwrap();
    assert_eq!(item.thumb, "");
    assert_eq!(item.author, constants().unknown_author);
    assert_eq!(item.link, "");
  }

  // --- Page shapes ---

  #[test]
  fn zero_matches_parse_as_empty() {
    let page: PhotoPage = serde_json::from_str(r#"{"photos":[],"total_results":0}"#).unwrap();
    assert!(page.photos.is_empty());
    let page: VideoPage = serde_json::from_str(r#"{"videos":[]}"#).unwrap();
    assert!(page.videos.is_empty());
  }

  #[test]
  fn missing_results_array_parses_as_empty() {
    let page: PhotoPage = serde_json::from_str(r#"{"total_results":0}"#).unwrap();
    assert!(page.photos.is_empty());
  }
}
