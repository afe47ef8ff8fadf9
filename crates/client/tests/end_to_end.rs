//! Client against a live router on an ephemeral port

use std::io::Cursor;
use std::sync::Arc;

use api::{create_router, AppState, ServerConfig};
use client::{comparison_path, output_path, save_and_compare, ClientConfig, DeblurClient};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use inference_engine::{InferenceEngine, PassthroughGenerator};

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let engine = InferenceEngine::with_generator(Arc::new(PassthroughGenerator), false);
    let app = create_router(Arc::new(AppState::new(engine, &ServerConfig::default())));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client_for(url: String) -> DeblurClient {
    let config = ClientConfig {
        api_url: url,
        timeout_secs: 30,
        ..Default::default()
    };
    DeblurClient::new(&config).unwrap()
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

#[tokio::test(flavor = "multi_thread")]
async fn test_jpeg_round_trip_saves_deblurred_png() {
    let base = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("street.jpg");
    std::fs::write(&input, jpeg(512, 512)).unwrap();

    let client = client_for(format!("{}/deblur", base));
    let result = client.deblur(&input).await.unwrap().expect("server returned an image");
    assert_eq!(result.dimensions(), (256, 256));

    let saved = save_and_compare(&input, &result, true).unwrap();
    assert_eq!(saved, dir.path().join("street_deblurred.png"));
    assert_eq!(saved, output_path(&input));

    let reopened = image::open(&saved).unwrap();
    assert_eq!((reopened.width(), reopened.height()), (256, 256));
    assert!(comparison_path(&input).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_truncated_file_returns_none() {
    let base = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.jpg");
    let bytes = jpeg(64, 64);
    std::fs::write(&input, &bytes[..16]).unwrap();

    let client = client_for(format!("{}/deblur", base));
    assert!(client.deblur(&input).await.unwrap().is_none());
    assert!(!output_path(&input).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_endpoint_returns_none() {
    let base = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ok.jpg");
    std::fs::write(&input, jpeg(32, 32)).unwrap();

    let client = client_for(format!("{}/missing", base));
    assert!(client.deblur(&input).await.unwrap().is_none());
}
