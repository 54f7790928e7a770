//! Combined conversion of several CL2 files into one sheet.

use crate::archive::Archive;
use crate::codec::{cl2_to_clx, set_sheet_list_offset, sheet_header_size};
use crate::error::{MinifyError, Result};
use crate::registry::Aggregator;
use crate::types::{archive_path, split_parent, with_file_name, CommandKind, ConversionCommand};

use super::Output;

/// Read the members of an aggregator into one sheet.
///
/// The buffer starts with a sheet header whose slot `i` holds the offset of
/// member `i`; member bytes follow back to back in declaration order.
pub fn read_combined<A: Archive + ?Sized>(archive: &mut A, files: &[String]) -> Result<Vec<u8>> {
    let mut members = Vec::with_capacity(files.len());
    let mut payload_size = 0;
    for file in files {
        let path = archive_path(file);
        let handle = archive.file_handle(&path)?;
        let size = archive.file_size(handle, &path)?;
        payload_size += size;
        members.push((path, handle, size));
    }

    let header_size = sheet_header_size(files.len());
    let mut data = vec![0u8; header_size + payload_size];
    let mut offset = header_size;
    for (index, (path, handle, size)) in members.into_iter().enumerate() {
        set_sheet_list_offset(&mut data, index, offset);
        archive.read_file_into(handle, &path, &mut data[offset..offset + size], true)?;
        offset += size;
    }
    Ok(data)
}

/// Output file name of a combined sheet: the first member's stem without
/// its trailing digits, with a `.clx` extension.
///
/// `towners/animals/cow1.cl2` becomes `cow.clx`.
pub fn combined_output_name(first: &str) -> String {
    let (_, file_name) = split_parent(first);
    let stem = match file_name.rfind('.') {
        Some(i) if i > 0 => &file_name[..i],
        _ => file_name,
    };
    format!("{}.clx", stem.trim_end_matches(|c: char| c.is_ascii_digit()))
}

/// Read, combine and convert the members of an aggregator.
///
/// The output sits next to the first member.
pub fn process_aggregator<A: Archive + ?Sized>(
    archive: &mut A,
    aggregator: &Aggregator,
) -> Result<Output> {
    let first = aggregator.files.first().ok_or_else(|| MinifyError::Config {
        message: "combine directive without files".to_string(),
        help: None,
    })?;

    let ConversionCommand::Cl2ToClx { widths } = &aggregator.command else {
        return Err(MinifyError::Config {
            message: format!(
                "Only CL2 files can be combined, got {} for {}",
                aggregator.command.kind(),
                first
            ),
            help: None,
        });
    };

    let mut data = read_combined(archive, &aggregator.files)?;
    cl2_to_clx(&mut data, widths)
        .map_err(|e| MinifyError::codec(CommandKind::Cl2ToClx, first.as_str(), e))?;

    Ok(Output {
        path: with_file_name(first, &combined_output_name(first)),
        data,
    })
}
