//! Local word-hit search
//!
//! Every query strand is searched against every subject. Subjects are
//! spread over the rayon pool; each worker keeps its own diagonal store,
//! batch buffer and hit list and reuses them for consecutive subjects.

use anyhow::{Context, Result};
use bio::io::fasta;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::blastinput::ScanArgs;
use crate::core::blast_diagnostics::{diagnostics_enabled, DiagnosticCounters};
use crate::core::blast_encoding::PackedSequence;
use crate::core::blast_extend::DiagContainer;
use crate::core::blast_hits::{InitHitList, InitHsp};
use crate::core::blast_nalookup::NaLookupTable;
use crate::core::blast_nascan::OffsetPair;
use crate::core::blast_parameters::{NuclScoringMatrix, WordFinderParams};
use crate::core::na_ungapped::ExtendContext;
use crate::core::query_info::QueryInfo;
use crate::error::ExtendError;
use crate::seed::blast_na_word_finder;

pub fn read_fasta(path: &Path) -> Result<Vec<fasta::Record>> {
    let reader = fasta::Reader::from_file(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse FASTA {}", path.display()))
}

/// First whitespace-separated token of a record id
fn record_id(record: &fasta::Record) -> &str {
    record.id().split_whitespace().next().unwrap_or("unknown")
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// One tab-separated row per hit: qid, sid, strand, q_start, s_start,
/// length, score. Minus-strand query starts are given on the plus strand.
/// Hits saved without extension report the word and `NA` as score.
fn write_hits(
    writer: &mut dyn Write,
    qid: &str,
    sid: &str,
    minus: bool,
    query_length: usize,
    word_size: usize,
    hsps: &[InitHsp],
) -> io::Result<()> {
    let strand = if minus { '-' } else { '+' };
    let plus_start = |q_start: usize, length: usize| {
        if minus {
            query_length.saturating_sub(q_start + length)
        } else {
            q_start
        }
    };
    for hsp in hsps {
        match hsp.ungapped_data {
            Some(u) => writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                qid,
                sid,
                strand,
                plus_start(u.q_start as usize, u.length as usize),
                u.s_start,
                u.length,
                u.score
            )?,
            None => writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\tNA",
                qid,
                sid,
                strand,
                plus_start(hsp.q_off as usize, word_size),
                hsp.s_off,
                word_size
            )?,
        }
    }
    Ok(())
}

pub fn run(args: ScanArgs) -> Result<()> {
    let num_threads = if args.num_threads == 0 {
        num_cpus::get()
    } else {
        args.num_threads
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("Failed to build thread pool")?;

    let options = args.word_options();
    options.validate()?;

    log::info!("Reading query & subject...");
    let queries = read_fasta(&args.query)?;
    let subjects = read_fasta(&args.subject)?;
    if queries.is_empty() || subjects.is_empty() {
        return Ok(());
    }

    let packed_subjects: Vec<PackedSequence> = subjects
        .par_iter()
        .map(|record| PackedSequence::new(record.seq()))
        .collect();
    let longest_subject = packed_subjects.iter().map(PackedSequence::len).max().unwrap_or(0);

    let (search_plus, search_minus) = args.strand.strands();
    let strands_per_query = search_plus as usize + search_minus as usize;
    let matrix = NuclScoringMatrix::new(options.reward, options.penalty);
    let diagnostics = diagnostics_enabled().then(DiagnosticCounters::default);

    let bar = ProgressBar::new((queries.len() * strands_per_query * subjects.len()) as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .context("Invalid progress bar template")?,
    );

    let mut writer = open_output(args.out.as_deref())?;

    for query_record in &queries {
        let qid = record_id(query_record);
        let plus = PackedSequence::new(query_record.seq());

        let minus = search_minus.then(|| plus.reverse_complement());
        let mut strands = Vec::with_capacity(strands_per_query);
        if search_plus {
            strands.push((false, plus));
        }
        if let Some(minus) = minus {
            strands.push((true, minus));
        }

        for (minus, query) in &strands {
            let query_info = QueryInfo::single(query.len());
            let params = WordFinderParams::new(&options, &query_info, longest_subject)?;
            let lookup = NaLookupTable::new(
                query,
                &query_info,
                params.lut_word_length,
                params.scan_step,
            )?;
            log::debug!(
                "query {} ({}): {} bases, {} distinct words, {:?} store",
                qid,
                if *minus { "minus" } else { "plus" },
                query.len(),
                lookup.num_words(),
                params.container_kind
            );

            let passes: Vec<Vec<InitHsp>> = packed_subjects
                .par_iter()
                .map_init(
                    || {
                        (
                            DiagContainer::new(params.container_kind, query.len(), options.window_size)
                                .map(|c| c.with_max_hash_cells(args.max_hash_cells)),
                            Vec::<OffsetPair>::new(),
                            InitHitList::new(),
                        )
                    },
                    |(container, offset_pairs, hitlist), subject| {
                        let container = container.as_mut().map_err(|e| e.clone())?;
                        hitlist.reset();
                        let ctx = ExtendContext {
                            query,
                            subject,
                            matrix: &matrix,
                            query_info: &query_info,
                            params: &params,
                        };
                        let pass = blast_na_word_finder(&ctx, &lookup, container, offset_pairs, hitlist);
                        bar.inc(1);
                        if let Some(counters) = &diagnostics {
                            match &pass {
                                Ok(stats) => {
                                    counters.record_pass(stats);
                                    for hsp in hitlist.iter() {
                                        if let Some(u) = hsp.ungapped_data {
                                            counters.record_score(u.score);
                                        }
                                    }
                                }
                                Err(_) => counters.record_failure(),
                            }
                        }
                        pass?;
                        Ok::<_, ExtendError>(hitlist.hsps().to_vec())
                    },
                )
                .collect::<std::result::Result<_, _>>()
                .with_context(|| format!("Word finder failed for query {}", qid))?;

            for (subject_record, hsps) in subjects.iter().zip(&passes) {
                write_hits(
                    &mut writer,
                    qid,
                    record_id(subject_record),
                    *minus,
                    query.len(),
                    options.word_size,
                    hsps,
                )?;
            }
        }
    }

    bar.finish_and_clear();
    writer.flush()?;

    if let Some(counters) = &diagnostics {
        counters.print_summary();
    }
    Ok(())
}
