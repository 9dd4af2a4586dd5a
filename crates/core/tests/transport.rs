use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec3;
use handlink::{
    FrameUpdate, NetworkEndpoint, PreFilter, PreFilterConfig, RawSample, ReceiveLoop, Received,
    SampleProducer, TrackingConfig, TrackingPipeline,
};

static PORT_COUNTER: AtomicU16 = AtomicU16::new(41000);

fn next_port() -> u16 {
    PORT_COUNTER.fetch_add(10, Ordering::SeqCst)
}

fn local(port: u16) -> SocketAddr {
    format!("127.0.0.1:{}", port).parse().unwrap()
}

fn wait_for_sample(endpoint: &mut NetworkEndpoint, timeout_ms: u64) -> Option<Received> {
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(timeout_ms) {
        match endpoint.receive().unwrap() {
            Received::Idle => continue,
            received => return Some(received),
        }
    }
    None
}

fn wait_for_frames(
    output: &handlink::LatestValue<FrameUpdate>,
    count: u64,
    timeout_ms: u64,
) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(timeout_ms) {
        if output.sequence() >= count {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

#[test]
fn test_sample_crosses_loopback() {
    let server_addr = local(next_port());
    let mut server = NetworkEndpoint::bind(server_addr).unwrap();
    let mut client = NetworkEndpoint::sender(server_addr).unwrap();

    let sample = RawSample::new(0.25, 0.75, -0.05, 0.12);
    let sent = client.send_sample(&sample).unwrap();
    assert!(sent > 0);

    match wait_for_sample(&mut server, 500).expect("No packet received") {
        Received::Sample(received, _) => {
            assert!((received.position - sample.position).abs().max_element() < 1e-5);
            assert!((received.finger_spread - sample.finger_spread).abs() < 1e-5);
        }
        other => panic!("Expected sample, got {:?}", other),
    }

    assert_eq!(client.stats().packets_sent, 1);
    assert_eq!(server.stats().packets_received, 1);
}

#[test]
fn test_malformed_packet_is_dropped_and_counted() {
    let server_addr = local(next_port());
    let mut server = NetworkEndpoint::bind(server_addr).unwrap();
    let client = NetworkEndpoint::sender(server_addr).unwrap();

    client.send_raw_to(b"0.5,0.5,0.0", server_addr).unwrap();
    client.send_raw_to(b"0.5,0.5,inf|0.1", server_addr).unwrap();

    let first = wait_for_sample(&mut server, 500).expect("No packet received");
    assert!(matches!(first, Received::Dropped(..)));
    let second = wait_for_sample(&mut server, 500).expect("No packet received");
    assert!(matches!(second, Received::Dropped(..)));

    let stats = server.stats();
    assert_eq!(stats.packets_malformed, 1);
    assert_eq!(stats.packets_invalid, 1);
}

#[test]
fn test_receive_loop_survives_garbage() {
    let server_addr = local(next_port());
    let endpoint = NetworkEndpoint::bind(server_addr).unwrap();
    let receiver = ReceiveLoop::with_endpoint(endpoint, TrackingPipeline::default());
    let handle = receiver.spawn().unwrap();

    let mut client = NetworkEndpoint::sender(server_addr).unwrap();
    client.send_raw_to(b"", server_addr).unwrap();
    client.send_raw_to(b"garbage|", server_addr).unwrap();
    client
        .send_sample(&RawSample::new(0.5, 0.5, 0.0, 0.08))
        .unwrap();

    let output = handle.output();
    assert!(wait_for_frames(&output, 1, 1000), "No frame published");

    let update = handle.take_latest().expect("frame pending");
    assert!(update.transform.position.length() < 1e-4);
    assert!((update.transform.scale - 0.8).abs() < 1e-4);

    let stats = handle.stats();
    assert_eq!(stats.packets_malformed, 2);
    assert!(!handle.is_finished());

    handle.join().unwrap();
}

#[test]
fn test_producer_to_consumer() {
    let port = next_port();
    let mut config = TrackingConfig::default();
    config.endpoint.addr = local(port);

    let handle = ReceiveLoop::bind(&config).unwrap().spawn().unwrap();
    assert_eq!(handle.local_addr(), local(port));

    let mut producer = SampleProducer::new(&config).unwrap();
    assert_eq!(producer.remote_addr(), Some(local(port)));

    let output = handle.output();
    for i in 1..=20u64 {
        producer.submit(RawSample::new(0.8, 0.5, 0.2, 0.3));
        // Pace the sender so each frame is observed rather than coalesced.
        assert!(wait_for_frames(&output, i, 1000), "frame {} missing", i);
    }

    let update = handle.take_latest().expect("frame pending");
    assert!((update.transform.position - Vec3::new(3.0, 0.0, 2.0)).length() < 0.01);
    assert_eq!(update.transform.scale, 2.0);
    assert!(!update.gesture);

    assert_eq!(producer.stats().packets_sent, 20);
    handle.join().unwrap();
}

#[test]
fn test_latest_value_overwrites_between_reads() {
    let server_addr = local(next_port());
    let endpoint = NetworkEndpoint::bind(server_addr).unwrap();
    let handle = ReceiveLoop::with_endpoint(endpoint, TrackingPipeline::default())
        .spawn()
        .unwrap();

    let mut client = NetworkEndpoint::sender(server_addr).unwrap();
    for _ in 0..5 {
        client
            .send_sample(&RawSample::new(0.5, 0.5, 0.0, 0.1))
            .unwrap();
    }

    let output = handle.output();
    assert!(wait_for_frames(&output, 5, 1000));

    assert!(handle.take_latest().is_some());
    assert!(handle.take_latest().is_none());
    handle.join().unwrap();
}

#[test]
fn test_shutdown_stops_receive_loop() {
    let server_addr = local(next_port());
    let endpoint = NetworkEndpoint::bind(server_addr).unwrap();
    let handle = ReceiveLoop::with_endpoint(endpoint, TrackingPipeline::default())
        .spawn()
        .unwrap();

    handle.shutdown();
    let start = Instant::now();
    while !handle.is_finished() {
        assert!(start.elapsed() < Duration::from_secs(2), "loop did not stop");
        thread::sleep(Duration::from_millis(5));
    }
    handle.join().unwrap();
}

#[test]
fn test_bind_conflict_is_fatal() {
    let server_addr = local(next_port());
    let _first = NetworkEndpoint::bind(server_addr).unwrap();

    let mut config = TrackingConfig::default();
    config.endpoint.addr = server_addr;
    assert!(ReceiveLoop::bind(&config).is_err());
}

#[test]
fn test_producer_rejects_invalid_config() {
    let mut config = TrackingConfig::default();
    config.endpoint.addr = local(next_port());
    config.scale.min_scale = 3.0;

    let err = SampleProducer::new(&config).err().unwrap();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

#[test]
fn test_pre_filter_smooths_before_send() {
    let server_addr = local(next_port());
    let mut server = NetworkEndpoint::bind(server_addr).unwrap();
    let client = NetworkEndpoint::sender(server_addr).unwrap();
    let mut producer =
        SampleProducer::with_endpoint(PreFilter::new(PreFilterConfig { window_size: 2 }), client);

    producer.submit(RawSample::new(0.2, 0.2, 0.0, 0.05));
    let sent = producer.submit(RawSample::new(0.4, 0.6, 0.1, 0.07));
    assert!((sent.position - Vec3::new(0.3, 0.4, 0.05)).length() < 1e-6);

    let mut last = None;
    for _ in 0..2 {
        if let Some(Received::Sample(sample, _)) = wait_for_sample(&mut server, 500) {
            last = Some(sample);
        }
    }
    let last = last.expect("No sample received");
    assert!((last.position - Vec3::new(0.3, 0.4, 0.05)).length() < 1e-4);
    assert!((last.finger_spread - 0.07).abs() < 1e-5);
}
