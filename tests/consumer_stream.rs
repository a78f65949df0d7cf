//! End-to-end: camera double -> capture loop -> TCP consumers

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use image::{GrayImage, ImageFormat, Luma};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use qrcam::detect::{Detection, Point};
use qrcam::device::DeviceStatus;
use qrcam::{
    Broadcaster, CameraDevice, CaptureConfig, CaptureLoop, ClientRegistry, CodeDetector,
    ConsumerServer, DesiredConfig, DeviceSyncController, FrameSize, Result, ServerConfig,
};

struct StillCamera {
    frame: Bytes,
}

impl StillCamera {
    fn new(width: u32, height: u32) -> Self {
        let img = GrayImage::from_pixel(width, height, Luma([200u8]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        Self {
            frame: Bytes::from(buf.into_inner()),
        }
    }
}

impl CameraDevice for StillCamera {
    async fn status(&self) -> Result<DeviceStatus> {
        Ok(DeviceStatus {
            led_intensity: 255,
            framesize: FrameSize::Qvga.value(),
        })
    }

    async fn control(&self, _var: &'static str, _value: i64) -> Result<()> {
        Ok(())
    }

    async fn capture(&self) -> Result<Bytes> {
        Ok(self.frame.clone())
    }
}

struct AlwaysSees(&'static str);

impl CodeDetector for AlwaysSees {
    fn detect(&self, _frame: &GrayImage) -> Result<Option<Detection>> {
        Ok(Some(Detection::new(
            self.0,
            [
                Point::new(10.0, 20.0),
                Point::new(30.0, 20.0),
                Point::new(30.0, 40.0),
                Point::new(10.0, 40.0),
            ],
        )))
    }
}

async fn wait_for_clients(registry: &ClientRegistry, count: usize) {
    for _ in 0..100 {
        if registry.current_clients().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("consumers never registered");
}

async fn read_line(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    tokio::time::timeout(Duration::from_secs(5), reader.read_line(&mut line))
        .await
        .expect("timed out waiting for a line")
        .unwrap();
    line
}

fn assert_event_line(line: &str) {
    assert!(line.ends_with('\n'), "line not terminated: {line:?}");
    let fields: Vec<&str> = line.trim_end().split(' ').collect();
    assert_eq!(fields.len(), 13, "unexpected field count: {line:?}");
    assert_eq!(fields[0], "qr");
    assert!(fields[1].parse::<u64>().is_ok());
    assert_eq!(fields[2], "ticket-42");
    assert_eq!(&fields[3..5], &["320", "240"]);
    assert_eq!(
        &fields[5..],
        &["10.0", "20.0", "30.0", "20.0", "30.0", "40.0", "10.0", "40.0"]
    );
}

#[tokio::test]
async fn test_consumers_receive_event_lines() {
    let registry = Arc::new(ClientRegistry::new());
    let server = ConsumerServer::bind(
        ServerConfig::with_addr("127.0.0.1:0".parse().unwrap()),
        Arc::clone(&registry),
    )
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();

    let shutdown = CancellationToken::new();
    let acceptor = server.spawn(shutdown.clone());

    let mut first = BufReader::new(TcpStream::connect(addr).await.unwrap());
    let mut second = BufReader::new(TcpStream::connect(addr).await.unwrap());
    let dropped = TcpStream::connect(addr).await.unwrap();
    wait_for_clients(&registry, 3).await;
    drop(dropped);

    let capture = CaptureLoop::new(
        CaptureConfig::default().capture_interval(Duration::from_millis(20)),
        DeviceSyncController::new(Arc::new(StillCamera::new(320, 240)), DesiredConfig::default()),
        Arc::new(AlwaysSees("ticket-42")),
        Arc::clone(&registry),
        Broadcaster::default(),
    );
    let runner = tokio::spawn(capture.run(shutdown.clone()));

    // Consecutive lines keep arriving at both live consumers
    for _ in 0..3 {
        assert_event_line(&read_line(&mut first).await);
        assert_event_line(&read_line(&mut second).await);
    }

    shutdown.cancel();
    let stats = runner.await.unwrap();
    acceptor.await.unwrap();

    assert!(stats.frames >= 3);
    assert_eq!(stats.codes, stats.frames);
    assert_eq!(stats.sync_attempts, 1);
    assert_eq!(registry.current_clients().len(), 2);
}

#[tokio::test]
async fn test_late_consumer_joins_stream() {
    let registry = Arc::new(ClientRegistry::new());
    let server = ConsumerServer::bind(
        ServerConfig::with_addr("127.0.0.1:0".parse().unwrap()),
        Arc::clone(&registry),
    )
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();

    let shutdown = CancellationToken::new();
    let acceptor = server.spawn(shutdown.clone());

    let capture = CaptureLoop::new(
        CaptureConfig::default().capture_interval(Duration::from_millis(20)),
        DeviceSyncController::new(Arc::new(StillCamera::new(320, 240)), DesiredConfig::default()),
        Arc::new(AlwaysSees("ticket-42")),
        Arc::clone(&registry),
        Broadcaster::default(),
    );
    let runner = tokio::spawn(capture.run(shutdown.clone()));

    // Loop is already running with nobody listening
    tokio::time::sleep(Duration::from_millis(60)).await;

    let mut late = BufReader::new(TcpStream::connect(addr).await.unwrap());
    assert_event_line(&read_line(&mut late).await);

    shutdown.cancel();
    runner.await.unwrap();
    acceptor.await.unwrap();
}
