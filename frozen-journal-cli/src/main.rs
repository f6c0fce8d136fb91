use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use frozen_journal::JournalDecoder;
use frozen_journal_cli::sink::EventProjection;
use frozen_journal_cli::storage::{parse_gcs_path, BucketSource, GcsBucketSource, LocalBucketSource};
use frozen_journal_cli::{init_logging, make_sink, output_writer, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let writer = output_writer(&args)?;
    let mut sink = make_sink(args.format, writer);

    let source: Box<dyn BucketSource> = if let Some(gcs) = args.input.strip_prefix("gs://") {
        Box::new(GcsBucketSource::new(parse_gcs_path(&format!(
            "gs://{gcs}"
        ))?))
    } else {
        Box::new(LocalBucketSource::new(&args.input))
    };

    let buckets = source.buckets()?;
    if buckets.is_empty() {
        bail!("no frozen buckets found under {}", args.input);
    }

    let mut total_events = 0u64;
    for bucket in &buckets {
        let started = Instant::now();
        let mut decoder = JournalDecoder::open(bucket)
            .with_context(|| format!("opening journal under {}", bucket.display()))?;

        let mut count = 0u64;
        while let Some(event) = decoder.next_owned() {
            sink.write_event(&EventProjection::from(&event))?;
            count += 1;
        }

        if let Some(err) = decoder.error() {
            log::error!(
                "bucket {} stopped decoding after {count} events: {err}",
                bucket.display()
            );
        }
        if args.report {
            eprintln!(
                "{}: {count} events in {:.3}s",
                bucket.display(),
                started.elapsed().as_secs_f64()
            );
        }
        total_events += count;
    }

    sink.finish()?;
    log::info!("decoded {total_events} events across {} bucket(s)", buckets.len());
    Ok(())
}
