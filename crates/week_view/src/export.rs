use crate::{
    error::{Result, WeekViewError},
    view::WeekView,
};
use chrono::Local;
use csv::WriterBuilder;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

pub fn export_to_csv_with_path(view: &WeekView, output_dir: Option<&Path>) -> Result<PathBuf> {
    let file_path = output_file(view, output_dir, "csv")?;
    let file = create_file(&file_path)?;

    let writer = BufWriter::new(file);
    #[allow(unused_mut)]
    let mut builder = WriterBuilder::new();
    #[cfg(windows)]
    {
        use csv::Terminator;
        builder = builder.terminator(Terminator::CRLF);
    }

    let mut wtr = builder.from_writer(writer);

    wtr.write_record(["time", "day_offset", "slot", "booking_id", "owner", "note"])?;
    for row in &view.rows {
        for cell in &row.cells {
            let day_offset = cell.day_offset.to_string();
            let (id, owner, note) = match &cell.booking {
                Some(b) => (b.id.to_string(), b.owner.as_str(), b.note.as_str()),
                None => (String::new(), "", ""),
            };
            wtr.write_record([
                row.time.as_str(),
                day_offset.as_str(),
                cell.key.as_str(),
                id.as_str(),
                owner,
                note,
            ])?;
        }
    }

    wtr.flush()?;
    Ok(file_path)
}

pub fn export_to_json_with_path(view: &WeekView, output_dir: Option<&Path>) -> Result<PathBuf> {
    let file_path = output_file(view, output_dir, "json")?;
    let file = create_file(&file_path)?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, view)?;
    writer.flush()?;
    Ok(file_path)
}

fn output_file(view: &WeekView, output_dir: Option<&Path>, extension: &str) -> Result<PathBuf> {
    let week = view.week_start.get(..10).unwrap_or(&view.week_start);
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let filename = format!("week_{week}_{timestamp}.{extension}");

    let file_path = if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir).map_err(|e| WeekViewError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        dir.join(&filename)
    } else {
        filename.into()
    };
    Ok(file_path)
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| WeekViewError::CreateFile {
        path: path.to_path_buf(),
        source: e,
    })
}
