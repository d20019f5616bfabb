//! Normalizes heterogeneous inputs into a [`PreparedList`].
//!
//! Paths are checked in order and preparation stops at the first blocking problem, so a list
//! with an error may hold fewer files than were offered. For `TooLargeFile` the offending file is
//! still appended, which lets the caller report its size.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Seek;
use std::path::Path;
use std::path::PathBuf;

use image::AnimationDecoder;
use image::ImageFormat;
use image::ImageReader;
use image::codecs::gif::GifDecoder;
use image::codecs::webp::WebPDecoder;
use mime_guess::mime;
use story_reply_protocol::PreparedFile;
use story_reply_protocol::PreparedFileType;
use story_reply_protocol::PreparedList;
use story_reply_protocol::PreparedListError;

use crate::DroppedUrl;

/// Photos more elongated than this are sent as documents.
const MAX_PHOTO_ASPECT_RATIO: u64 = 20;

/// Header facts about an encoded image that decoded successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub animated: bool,
}

/// Decode in-memory image bytes. Returns `None` when the bytes are not a supported image.
pub fn read_image(content: &[u8]) -> Option<DecodedImage> {
    let format = image::guess_format(content).ok()?;
    let decoded = match image::load_from_memory_with_format(content, format) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::trace!("image decode failed: {err}");
            return None;
        }
    };
    Some(DecodedImage {
        format,
        width: decoded.width(),
        height: decoded.height(),
        animated: is_animated(format, Cursor::new(content)),
    })
}

/// Prepare files picked from disk.
pub fn prepare_media_list(paths: &[PathBuf], size_limit: u64) -> PreparedList {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let display = path.display().to_string();
        let size = match std::fs::metadata(path) {
            Ok(metadata) if !metadata.is_dir() => metadata.len(),
            _ => return PreparedList::with_error(PreparedListError::Directory, display),
        };
        if size == 0 {
            return PreparedList::with_error(PreparedListError::EmptyFile, display);
        }

        let mut file = PreparedFile::from_path(path.clone(), size);
        if size > size_limit {
            files.push(file);
            return PreparedList {
                error: PreparedListError::TooLargeFile,
                error_data: display,
                files,
                ..Default::default()
            };
        }
        classify_path(&mut file, path);
        files.push(file);
    }
    PreparedList::new(files)
}

/// Prepare dropped or pasted URL entries. Any non-local entry fails the whole list.
pub fn prepare_media_from_urls(urls: &[DroppedUrl], size_limit: u64) -> PreparedList {
    let mut paths = Vec::with_capacity(urls.len());
    for url in urls {
        match url {
            DroppedUrl::Local(path) => paths.push(path.clone()),
            DroppedUrl::Remote(url) => {
                return PreparedList::with_error(PreparedListError::NonLocalUrl, url.clone());
            }
        }
    }
    prepare_media_list(&paths, size_limit)
}

/// Wrap an already decoded in-memory image as a one-item list.
pub fn prepare_media_from_image(image: &DecodedImage, content: Vec<u8>) -> PreparedList {
    let extension = image.format.extensions_str().first().copied().unwrap_or("png");
    let mut file = PreparedFile::from_content(format!("image.{extension}"), content);
    file.mime_type = Some(image.format.to_mime_type().to_string());
    file.dimensions = Some((image.width, image.height));
    file.is_animated = image.animated;
    file.file_type = if !image.animated && is_photo_dimensions(image.width, image.height) {
        PreparedFileType::Photo
    } else {
        PreparedFileType::File
    };
    PreparedList::new(vec![file])
}

fn classify_path(file: &mut PreparedFile, path: &Path) {
    let guessed = mime_guess::from_path(path).first();
    file.mime_type = guessed.as_ref().map(|mime| mime.essence_str().to_string());

    if let Some(image) = read_image_file(path) {
        tracing::debug!(
            "prepared image {} {}x{} animated={}",
            file.display_name,
            image.width,
            image.height,
            image.animated
        );
        file.mime_type = Some(image.format.to_mime_type().to_string());
        file.dimensions = Some((image.width, image.height));
        file.is_animated = image.animated;
        file.file_type = if !image.animated && is_photo_dimensions(image.width, image.height) {
            PreparedFileType::Photo
        } else {
            PreparedFileType::File
        };
        return;
    }

    file.file_type = match guessed.as_ref().map(mime::Mime::type_) {
        Some(kind) if kind == mime::VIDEO => PreparedFileType::Video,
        Some(kind) if kind == mime::AUDIO => PreparedFileType::Music,
        _ => PreparedFileType::File,
    };
}

fn read_image_file(path: &Path) -> Option<DecodedImage> {
    let reader = ImageReader::open(path).ok()?.with_guessed_format().ok()?;
    let format = reader.format()?;
    let (width, height) = match reader.into_dimensions() {
        Ok(dimensions) => dimensions,
        Err(err) => {
            tracing::trace!("image header read failed for {}: {err}", path.display());
            return None;
        }
    };
    let animated = File::open(path)
        .map(|file| is_animated(format, BufReader::new(file)))
        .unwrap_or(false);
    Some(DecodedImage {
        format,
        width,
        height,
        animated,
    })
}

fn is_animated<R: BufRead + Seek>(format: ImageFormat, reader: R) -> bool {
    match format {
        ImageFormat::Gif => GifDecoder::new(reader)
            .map(|decoder| decoder.into_frames().take(2).count() > 1)
            .unwrap_or(false),
        ImageFormat::WebP => WebPDecoder::new(reader)
            .map(|decoder| decoder.has_animation())
            .unwrap_or(false),
        _ => false,
    }
}

fn is_photo_dimensions(width: u32, height: u32) -> bool {
    let (width, height) = (u64::from(width), u64::from(height));
    width > 0
        && height > 0
        && width < MAX_PHOTO_ASPECT_RATIO * height
        && height < MAX_PHOTO_ASPECT_RATIO * width
}
