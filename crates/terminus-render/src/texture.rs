//! Image decoding off the render thread and GPU texture upload.
//!
//! [`TextureLoader`] owns one worker thread fed through a crossbeam channel.
//! The app requests every asset at startup, binds placeholders, and swaps
//! in real textures as [`TextureLoader::drain_results`] hands them back.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use glam::Vec3;
use wgpu::util::DeviceExt;

/// Failures while loading an image asset.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image load error: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("image {path} has zero size")]
    Empty { path: PathBuf },

    #[error("texture loader worker is gone")]
    WorkerDisconnected,
}

/// Which scene input an asset feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Day,
    Displacement,
    Clouds,
    Night,
    Environment,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 5] = [
        TextureSlot::Day,
        TextureSlot::Displacement,
        TextureSlot::Clouds,
        TextureSlot::Night,
        TextureSlot::Environment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextureSlot::Day => "day-texture",
            TextureSlot::Displacement => "displacement-texture",
            TextureSlot::Clouds => "cloud-texture",
            TextureSlot::Night => "night-texture",
            TextureSlot::Environment => "environment-map",
        }
    }

    /// Texel bound until the real image arrives or after it fails.
    pub fn placeholder_texel(self) -> [u8; 4] {
        match self {
            TextureSlot::Clouds => [0, 0, 0, 0],
            _ => [0, 0, 0, 255],
        }
    }
}

/// Decoded 8-bit RGBA pixels, bottom row first.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// What the scene keeps from the environment map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvironmentSummary {
    /// Solid-angle weighted mean radiance of the equirectangular image.
    pub mean_radiance: Vec3,
}

#[derive(Debug)]
pub enum LoadedAsset {
    Image(LoadedImage),
    Environment(EnvironmentSummary),
}

struct LoadRequest {
    slot: TextureSlot,
    path: PathBuf,
}

/// One finished request.
#[derive(Debug)]
pub struct LoadOutcome {
    pub slot: TextureSlot,
    pub path: PathBuf,
    pub result: Result<LoadedAsset, TextureError>,
}

fn read_image(path: &Path) -> Result<image::DynamicImage, TextureError> {
    let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(TextureError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(image)
}

/// Decodes an image to RGBA8 and flips it so v = 1 samples the top row.
pub fn decode_image(path: &Path) -> Result<LoadedImage, TextureError> {
    let mut rgba = read_image(path)?.to_rgba8();
    image::imageops::flip_vertical_in_place(&mut rgba);
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Decodes an equirectangular image and reduces it to its mean radiance.
pub fn decode_environment(path: &Path) -> Result<EnvironmentSummary, TextureError> {
    let pixels = read_image(path)?.to_rgb32f();
    Ok(EnvironmentSummary {
        mean_radiance: mean_radiance(&pixels),
    })
}

/// Mean of an equirectangular image, weighting each row by the solid angle
/// it covers.
pub fn mean_radiance(pixels: &image::Rgb32FImage) -> Vec3 {
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return Vec3::ZERO;
    }
    let mut sum = Vec3::ZERO;
    let mut total_weight = 0.0f32;
    for (y, row) in pixels.rows().enumerate() {
        let theta = (y as f32 + 0.5) / height as f32 * std::f32::consts::PI;
        let weight = theta.sin();
        for pixel in row {
            sum += Vec3::from(pixel.0) * weight;
        }
        total_weight += weight * width as f32;
    }
    if total_weight > 0.0 {
        sum / total_weight
    } else {
        Vec3::ZERO
    }
}

fn load(slot: TextureSlot, path: &Path) -> Result<LoadedAsset, TextureError> {
    match slot {
        TextureSlot::Environment => decode_environment(path).map(LoadedAsset::Environment),
        _ => decode_image(path).map(LoadedAsset::Image),
    }
}

/// Background image decoder.
pub struct TextureLoader {
    request_sender: Option<crossbeam_channel::Sender<LoadRequest>>,
    result_receiver: crossbeam_channel::Receiver<LoadOutcome>,
    worker: Option<JoinHandle<()>>,
}

impl TextureLoader {
    pub fn new() -> Result<Self, TextureError> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let worker = std::thread::Builder::new()
            .name("texture-loader".into())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    let result = load(request.slot, &request.path);
                    let _ = result_tx.send(LoadOutcome {
                        slot: request.slot,
                        path: request.path,
                        result,
                    });
                }
            })
            .map_err(|source| TextureError::Io {
                path: PathBuf::from("<texture-loader thread>"),
                source,
            })?;

        Ok(Self {
            request_sender: Some(request_tx),
            result_receiver: result_rx,
            worker: Some(worker),
        })
    }

    /// Queues `path` for decoding into `slot`.
    pub fn request(&self, slot: TextureSlot, path: impl Into<PathBuf>) -> Result<(), TextureError> {
        let sender = self
            .request_sender
            .as_ref()
            .ok_or(TextureError::WorkerDisconnected)?;
        sender
            .send(LoadRequest {
                slot,
                path: path.into(),
            })
            .map_err(|_| TextureError::WorkerDisconnected)
    }

    /// Finished loads, in completion order. Never blocks.
    pub fn drain_results(&self) -> Vec<LoadOutcome> {
        let mut results = Vec::new();
        while let Ok(outcome) = self.result_receiver.try_recv() {
            results.push(outcome);
        }
        results
    }

    /// Closes the request channel and joins the worker after it finishes
    /// whatever is already queued.
    pub fn shutdown(&mut self) {
        self.request_sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A sampled 2D texture on the GPU.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    /// Uploads raw RGBA8 values. Colors are not decoded from sRGB.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &LoadedImage,
    ) -> Self {
        Self::from_rgba(device, queue, label, image.width, image.height, &image.rgba)
    }

    /// A 1x1 texture of `texel`.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, texel: [u8; 4]) -> Self {
        Self::from_rgba(device, queue, label, 1, 1, &texel)
    }

    fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Linear filtering, clamped at the edges.
pub fn create_surface_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("surface-sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_device;
    use std::time::{Duration, Instant};

    /// 2x2 PNG: top row red, bottom row blue.
    fn write_test_png(dir: &Path) -> PathBuf {
        let path = dir.join("tiny.png");
        let img = image::RgbaImage::from_fn(2, 2, |_, y| {
            if y == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        });
        img.save(&path).expect("write png");
        path
    }

    #[test]
    fn test_decode_flips_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let image = decode_image(&write_test_png(dir.path())).expect("decode");
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.rgba.len(), 16);
        // First stored row is the bottom of the picture.
        assert_eq!(&image.rgba[0..4], &[0, 0, 255, 255]);
        assert_eq!(&image.rgba[8..12], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = decode_image(&dir.path().join("nope.jpg"));
        assert!(matches!(result, Err(TextureError::Io { .. })));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not an image").expect("write");
        assert!(matches!(
            decode_image(&path),
            Err(TextureError::ImageLoad(_))
        ));
    }

    #[test]
    fn test_mean_radiance_of_constant_image() {
        let pixels = image::Rgb32FImage::from_pixel(8, 4, image::Rgb([0.5, 1.0, 2.0]));
        let mean = mean_radiance(&pixels);
        assert!((mean - Vec3::new(0.5, 1.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_mean_radiance_discounts_poles() {
        // Bright top row, dark elsewhere: the pole row covers little solid angle.
        let pixels = image::Rgb32FImage::from_fn(4, 8, |_, y| {
            if y == 0 {
                image::Rgb([1.0, 1.0, 1.0])
            } else {
                image::Rgb([0.0, 0.0, 0.0])
            }
        });
        let mean = mean_radiance(&pixels);
        assert!(mean.x > 0.0);
        assert!(mean.x < 1.0 / 8.0);
    }

    #[test]
    fn test_loader_round_trip_and_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = write_test_png(dir.path());
        let mut loader = TextureLoader::new().expect("spawn loader");
        loader.request(TextureSlot::Day, &good).expect("request");
        loader
            .request(TextureSlot::Night, dir.path().join("missing.png"))
            .expect("request");
        loader
            .request(TextureSlot::Environment, &good)
            .expect("request");

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut outcomes = Vec::new();
        while outcomes.len() < 3 && Instant::now() < deadline {
            outcomes.extend(loader.drain_results());
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].slot, TextureSlot::Day);
        assert!(matches!(outcomes[0].result, Ok(LoadedAsset::Image(_))));
        assert!(outcomes[1].result.is_err());
        assert!(matches!(
            outcomes[2].result,
            Ok(LoadedAsset::Environment(_))
        ));

        loader.shutdown();
        assert!(matches!(
            loader.request(TextureSlot::Day, &good),
            Err(TextureError::WorkerDisconnected)
        ));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(TextureSlot::Clouds.placeholder_texel()[3], 0);
        assert_eq!(TextureSlot::Day.placeholder_texel(), [0, 0, 0, 255]);
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let tex = GpuTexture::solid(&device, &queue, "placeholder", [1, 2, 3, 4]);
        assert_eq!(tex.texture.width(), 1);
        assert_eq!(tex.texture.format(), wgpu::TextureFormat::Rgba8Unorm);
    }
}
