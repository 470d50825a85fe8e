use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::hypergraph::Hypergraph;

/// Errors raised while reading a netlist.
#[derive(Debug, Error)]
pub enum NetlistError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

fn parse_error(line: usize, message: impl Into<String>) -> NetlistError {
    NetlistError::Parse {
        line,
        message: message.into(),
    }
}

/// Pin lists and module numbering read from a netD file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetD {
    pub num_modules: usize,
    /// Pad `pN` is module `pad_offset + N`.
    pub pad_offset: usize,
    pub nets: Vec<Vec<usize>>,
    /// Every pad seen in a net.
    pub pads: Vec<usize>,
}

// Module name `aN` is module N, pad name `pN` is module `pad_offset + N`.
fn parse_module(name: &str, pad_offset: usize, line: usize) -> Result<usize, NetlistError> {
    let (is_pad, index) = if let Some(index) = name.strip_prefix('a') {
        (false, index)
    } else if let Some(index) = name.strip_prefix('p') {
        (true, index)
    } else {
        return Err(parse_error(line, format!("bad module name {name:?}")));
    };
    let index: usize = index
        .parse()
        .map_err(|_| parse_error(line, format!("bad module name {name:?}")))?;
    Ok(if is_pad { pad_offset + index } else { index })
}

fn parse_header_field<'a>(
    lines: &mut impl Iterator<Item = (usize, std::io::Result<String>)>,
    field: &str,
) -> Result<usize, NetlistError> {
    let (line, text) = lines
        .next()
        .ok_or_else(|| parse_error(0, format!("missing {field}")))?;
    text?
        .trim()
        .parse()
        .map_err(|_| parse_error(line, format!("bad {field}")))
}

/// Parse the netD format.
///
/// Five header lines (a leading 0, the number of pins, nets and modules, and
/// the pad offset) are followed by one pin per line: a module name and `s` when
/// the pin starts a new net or `l` when it continues the current one. Anything
/// after these two fields is ignored.
pub fn parse_netd(reader: impl BufRead) -> Result<NetD, NetlistError> {
    let mut lines = reader.lines().enumerate().map(|(index, text)| (index + 1, text));
    parse_header_field(&mut lines, "leading 0")?;
    let num_pins = parse_header_field(&mut lines, "number of pins")?;
    let num_nets = parse_header_field(&mut lines, "number of nets")?;
    let num_modules = parse_header_field(&mut lines, "number of modules")?;
    let pad_offset = parse_header_field(&mut lines, "pad offset")?;

    let mut nets: Vec<Vec<usize>> = Vec::with_capacity(num_nets);
    let mut pads = Vec::new();
    let mut pins_read = 0;
    let mut last_line = 5;
    for (line, text) in lines {
        let text = text?;
        last_line = line;
        let mut fields = text.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };
        let v = parse_module(name, pad_offset, line)?;
        if v >= num_modules {
            return Err(parse_error(line, format!("module {name} is out of range")));
        }
        if name.starts_with('p') {
            pads.push(v);
        }
        match fields.next() {
            Some("s") => nets.push(vec![v]),
            Some("l") => match nets.last_mut() {
                Some(net) => net.push(v),
                None => return Err(parse_error(line, "pin before the first net")),
            },
            _ => return Err(parse_error(line, "expected `s` or `l` after the module name")),
        }
        pins_read += 1;
    }

    if nets.len() != num_nets {
        return Err(parse_error(
            last_line,
            format!("expected {num_nets} nets, found {}", nets.len()),
        ));
    }
    if pins_read != num_pins {
        return Err(parse_error(
            last_line,
            format!("expected {num_pins} pins, found {pins_read}"),
        ));
    }
    pads.sort_unstable();
    pads.dedup();
    Ok(NetD {
        num_modules,
        pad_offset,
        nets,
        pads,
    })
}

/// Parse module weights in the area format, one `name weight` pair per line.
/// Modules that are not listed weigh 1.
pub fn parse_are(
    reader: impl BufRead,
    num_modules: usize,
    pad_offset: usize,
) -> Result<Vec<u32>, NetlistError> {
    let mut weights = vec![1; num_modules];
    for (index, text) in reader.lines().enumerate() {
        let line = index + 1;
        let text = text?;
        let mut fields = text.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };
        let v = parse_module(name, pad_offset, line)?;
        let weight = fields
            .next()
            .and_then(|weight| weight.parse().ok())
            .ok_or_else(|| parse_error(line, format!("missing or bad weight for {name}")))?;
        match weights.get_mut(v) {
            Some(slot) => *slot = weight,
            None => return Err(parse_error(line, format!("module {name} is out of range"))),
        }
    }
    Ok(weights)
}

/// Read a netD file (and optionally its area file) as a hypergraph.
///
/// Pads are fixed modules.
pub fn read_netd_as_hypergraph(
    netd_path: &Path,
    are_path: Option<&Path>,
) -> Result<Hypergraph, NetlistError> {
    let netd = parse_netd(BufReader::new(File::open(netd_path)?))?;
    let mut hgr = Hypergraph::new(netd.num_modules, &netd.nets).with_fixed_modules(netd.pads);
    if let Some(are_path) = are_path {
        let weights = parse_are(
            BufReader::new(File::open(are_path)?),
            netd.num_modules,
            netd.pad_offset,
        )?;
        hgr = hgr.with_module_weights(weights);
    }
    Ok(hgr)
}

/// Write the partition array to a file, one part id per line.
pub fn write_partition_data_to_file(partition: &[usize], file_path: &Path) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(file_path)?);
    for part in partition {
        writeln!(file, "{part}")?;
    }
    file.flush()
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use crate::gen_hypergraph::create_dwarf;
    use crate::io::*;

    fn create_mock_file(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let file_path = dir.join(filename);
        let mut file = File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_netd() {
        // Arrange
        let content = "0\n5\n2\n4\n2\na0 s 1\na1 l\np1 s\na0 l\na2 l\n";

        // Act
        let netd = parse_netd(content.as_bytes()).unwrap();

        // Assert
        assert_eq!(netd.num_modules, 4);
        assert_eq!(netd.nets, [vec![0, 1], vec![3, 0, 2]]);
        assert_eq!(netd.pads, [3]);
    }

    #[test]
    fn test_parse_netd_reports_line_of_bad_pin() {
        // Arrange
        let content = "0\n2\n1\n2\n1\na0 s\nb1 l\n";

        // Act
        let result = parse_netd(content.as_bytes());

        // Assert
        assert!(matches!(result, Err(NetlistError::Parse { line: 7, .. })));
    }

    #[test]
    fn test_parse_netd_checks_counts() {
        // Arrange
        let content = "0\n3\n1\n2\n1\na0 s\na1 l\n";

        // Act
        let result = parse_netd(content.as_bytes());

        // Assert
        assert!(matches!(result, Err(NetlistError::Parse { .. })));
    }

    #[test]
    fn test_parse_are() {
        // Arrange
        let content = "a0 3\na2 5\np1 0\n";

        // Act
        let weights = parse_are(content.as_bytes(), 4, 2).unwrap();

        // Assert
        assert_eq!(weights, [3, 1, 5, 0]);
    }

    #[test]
    fn test_read_dwarf_fixture() -> Result<(), NetlistError> {
        // Arrange
        let expected = create_dwarf();

        // Act
        let hgr = read_netd_as_hypergraph(
            Path::new("./testdata/dwarf.net"),
            Some(Path::new("./testdata/dwarf.are")),
        )?;

        // Assert
        assert_eq!(hgr.number_of_modules(), 7);
        assert_eq!(hgr.number_of_nets(), 6);
        assert_eq!(hgr.module_fixed, expected.module_fixed);
        for node in hgr.modules().chain(hgr.nets()) {
            assert_eq!(hgr.neighbors(node), expected.neighbors(node));
        }
        for v in hgr.modules() {
            assert_eq!(hgr.get_module_weight(v), expected.get_module_weight(v));
        }
        Ok(())
    }

    #[test]
    fn test_write_partition_data_to_file() -> Result<(), std::io::Error> {
        // Arrange
        let temp_dir = tempdir()?;
        let file_path = temp_dir.path().join("dwarf.part");

        // Act
        write_partition_data_to_file(&[0, 1, 1, 0], &file_path)?;

        // Assert
        assert_eq!(std::fs::read_to_string(&file_path)?, "0\n1\n1\n0\n");
        Ok(())
    }

    #[test]
    fn test_read_netd_from_file() -> Result<(), NetlistError> {
        // Arrange
        let temp_dir = tempdir()?;
        let netd_path = create_mock_file(temp_dir.path(), "tiny.net", "0\n4\n2\n3\n2\na0 s\na1 l\na1 s\na2 l\n");

        // Act
        let hgr = read_netd_as_hypergraph(&netd_path, None)?;

        // Assert
        assert_eq!(hgr.number_of_modules(), 3);
        assert_eq!(hgr.neighbors(4), [1, 2]);
        assert!(hgr.module_fixed.is_empty());
        Ok(())
    }
}
