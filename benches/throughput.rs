use bytes::BytesMut;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use relay_proto::{LineCodec, ServerCommand, WireMessage, chat_line};
use relayd::handlers::broadcast;
use relayd::network::ConnectionHandle;
use relayd::state::ConnectionRegistry;
use std::hint::black_box;
use std::net::SocketAddr;
use tokio_util::codec::Decoder;
use tokio_util::sync::CancellationToken;

fn grammar_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("grammar");
    group.throughput(Throughput::Elements(1));

    group.bench_function("parse_login", |b| {
        b.iter(|| WireMessage::parse(black_box("#login alice")))
    });
    group.bench_function("parse_chat", |b| {
        b.iter(|| WireMessage::parse(black_box("hello everyone, how is it going?")))
    });
    group.bench_function("parse_setport", |b| {
        b.iter(|| ServerCommand::parse(black_box("#setport 5555")))
    });
    group.bench_function("format_chat", |b| {
        b.iter(|| chat_line(black_box("alice"), black_box("hello")))
    });

    group.finish();
}

fn codec_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let raw = b"alice> the quick brown fox jumps over the lazy dog\n".repeat(64);
    group.throughput(Throughput::Bytes(raw.len() as u64));

    group.bench_function("decode_64_lines", |b| {
        b.iter(|| {
            let mut codec = LineCodec::new();
            let mut buf = BytesMut::from(&raw[..]);
            let mut count = 0;
            while let Ok(Some(_)) = codec.decode(&mut buf) {
                count += 1;
            }
            count
        })
    });

    group.finish();
}

// Fan-out to N authenticated connections; queues are drained each round.
fn broadcast_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");
    let addr: SocketAddr = "127.0.0.1:5555".parse().unwrap();

    for recipients in [1usize, 16, 128] {
        let registry = ConnectionRegistry::default();
        let mut receivers = Vec::with_capacity(recipients);
        for id in 0..recipients as u64 {
            let (handle, rx) = ConnectionHandle::new(id, addr, 4, CancellationToken::new());
            registry.register(handle);
            registry.set_login(id, &format!("user{id}")).unwrap();
            receivers.push(rx);
        }

        group.throughput(Throughput::Elements(recipients as u64));
        group.bench_function(format!("fanout_{recipients}"), |b| {
            b.iter(|| {
                let delivered = broadcast(&registry, "alice> hello");
                for rx in receivers.iter_mut() {
                    while rx.try_recv().is_ok() {}
                }
                delivered
            })
        });
    }

    group.finish();
}

criterion_group!(benches, grammar_benchmark, codec_benchmark, broadcast_benchmark);
criterion_main!(benches);
