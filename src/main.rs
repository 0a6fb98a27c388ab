use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use mfm::{DemodConfig, Demodulator};
use rustfft::num_complex::Complex32;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const READ_LEN: usize = 16 * 16384;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mfm=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run() {
        warn!("demodulation failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        return Err("usage: mfm <input.cu8 | -> [config.json]".into());
    };
    let config = match args.next() {
        Some(path) => DemodConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => DemodConfig::default(),
    };

    let reader: Box<dyn Read> = if input == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(&input)?)
    };
    let mut reader = BufReader::new(reader);
    let mut out = BufWriter::new(io::stdout().lock());

    let chunk_size = config.chunk_size;
    let mut demod = Demodulator::new(config)?;
    info!(
        "Demodulating {} at {} S/s into {} Hz audio ({} backend)",
        input,
        demod.config().signal_rate,
        demod.config().audio_rate,
        demod.backend_name()
    );

    let mut frame = vec![0u8; READ_LEN];
    let mut carry = 0usize;
    let mut incoming_samples: Vec<Complex32> = Vec::new();
    let mut written = 0usize;

    loop {
        let n = reader.read(&mut frame[carry..])?;
        let eof = n == 0;
        let available = carry + n;
        let paired = available - available % 2;
        incoming_samples.extend(frame[..paired].chunks_exact(2).map(|iq| {
            Complex32::new(
                (iq[0] as i32 - 127) as f32 / 128.0,
                (iq[1] as i32 - 127) as f32 / 128.0,
            )
        }));
        carry = available - paired;
        if carry == 1 {
            frame[0] = frame[paired];
        }

        while incoming_samples.len() >= chunk_size || (eof && !incoming_samples.is_empty()) {
            let take = chunk_size.min(incoming_samples.len());
            let samples: Vec<Complex32> = incoming_samples.drain(..take).collect();
            let audio = demod.demodulate(&samples)?;
            written += audio.len();
            out.write_all(&pack_s16le(&audio))?;
        }

        if eof {
            if carry != 0 {
                warn!("dropping unpaired trailing byte");
            }
            break;
        }
    }

    out.flush()?;
    debug!("residual bias {:.6}", demod.dc_bias());
    info!("Wrote {} audio samples", written);
    Ok(())
}

fn pack_s16le(audio: &[f32]) -> bytes::Bytes {
    audio
        .iter()
        .flat_map(|it| ((it * i16::MAX as f32) as i16).to_le_bytes())
        .collect()
}
