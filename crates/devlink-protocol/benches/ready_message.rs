//! Encode and decode cost of a ReadyMessage

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use devlink_protocol::{
    root_as_ready_message, Builder, OwnedReadyMessage, OwnedWifiNetwork, ReadyMessage,
    WifiAuthMode,
};

fn message(saved: usize) -> OwnedReadyMessage {
    OwnedReadyMessage {
        poggies: true,
        rftx_pin: 17,
        account_linked: true,
        networks_saved: (0..saved).map(|i| format!("AA:BB:CC:DD:EE:{:02X}", i)).collect(),
        network_connected: Some(OwnedWifiNetwork {
            ssid: Some("HomeNet".to_string()),
            bssid: Some("AA:BB:CC:DD:EE:00".to_string()),
            channel: 6,
            rssi: -60,
            auth_mode: WifiAuthMode::Wpa2Psk,
            saved: true,
        }),
    }
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("ready_encode");
    for saved in [0usize, 4, 32] {
        let msg = message(saved);
        let mut builder = Builder::new();
        group.bench_with_input(BenchmarkId::from_parameter(saved), &msg, |b, msg| {
            b.iter(|| {
                builder.reset();
                let root = msg.pack(&mut builder).unwrap();
                builder.finish_size_prefixed(root).unwrap();
                black_box(builder.finished_data().unwrap().len());
            });
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let buf = message(4).encode().unwrap();

    c.bench_function("ready_verify_single_field", |b| {
        b.iter(|| {
            let ready = ReadyMessage::read_from(black_box(&buf), 0).unwrap();
            black_box(ready.rftx_pin());
        });
    });

    c.bench_function("ready_verify_unpack", |b| {
        b.iter(|| {
            let ready = root_as_ready_message(black_box(&buf)).unwrap();
            black_box(ready.unpack());
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
