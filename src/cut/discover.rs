use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::config::WorkLayout;

/// Walk the root for processable video files, skipping the tool's own temp
/// and output trees. Sorted so batches run in a deterministic order.
pub fn find_video_files(layout: &WorkLayout, extensions: &[String]) -> Vec<PathBuf> {
    let mut videos: Vec<PathBuf> = WalkDir::new(&layout.root)
        .into_iter()
        .filter_entry(|entry| !is_working_dir(entry.path(), layout))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), extensions))
        .map(|entry| entry.into_path())
        .collect();
    videos.sort();
    videos
}

fn is_working_dir(path: &Path, layout: &WorkLayout) -> bool {
    path == layout.temp_dir || path == layout.out_dir
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(ext))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn finds_videos_recursively_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.mkv"));
        touch(&root.join("talks/a.mkv"));
        touch(&root.join("notes.txt"));

        let layout = WorkLayout::new(root, None, None);
        let videos = find_video_files(&layout, &["mkv".to_string()]);
        assert_eq!(videos, vec![root.join("b.mkv"), root.join("talks/a.mkv")]);
    }

    #[test]
    fn skips_temp_and_out_trees() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.mkv"));
        touch(&root.join("temp/cached.mkv"));
        touch(&root.join("out/a.mkv"));

        let layout = WorkLayout::new(root, None, None);
        let videos = find_video_files(&layout, &["mkv".to_string()]);
        assert_eq!(videos, vec![root.join("a.mkv")]);
    }

    #[test]
    fn extension_match_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("shouty.MKV"));
        touch(&root.join("clip.mp4"));

        let layout = WorkLayout::new(root, None, None);
        let videos = find_video_files(&layout, &["mkv".to_string()]);
        assert_eq!(videos, vec![root.join("shouty.MKV")]);
    }
}
