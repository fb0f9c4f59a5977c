use std::path::Path;

use irbridge_shared::CodeBook;

use crate::vcdutils::read_signals;

/// Classify every signal in a capture file.
pub fn command_classify(book: &CodeBook, path: &Path) -> anyhow::Result<()> {
    let signals = read_signals(path)?;

    if signals.is_empty() {
        println!("No signals in {}", path.display());
    }

    for (n, line) in describe(book, &signals).iter().enumerate() {
        println!("{}\t{}", n, line);
    }

    Ok(())
}

fn describe(book: &CodeBook, signals: &[Vec<u16>]) -> Vec<String> {
    signals
        .iter()
        .map(|samples| match book.classify(samples) {
            Some(index) => {
                let name = book.name(index).unwrap_or("?");
                match book.translation(index).and_then(|to| book.name(to)) {
                    Some(target) => format!("{} -> {}", name, target),
                    None => name.to_string(),
                }
            }
            None => format!("unknown\tlen: {}\t{:?}", samples.len(), samples),
        })
        .collect()
}
