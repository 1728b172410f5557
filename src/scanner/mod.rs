//! Dataset and image file discovery

use crate::error::{PlantAiError, Result};
use plant_disease_common::LabelCatalog;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One class folder of the training dataset
#[derive(Debug, Clone)]
pub struct ClassFolder {
    pub path: PathBuf,
    pub name: String,
    pub image_count: usize,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

/// True for the image types accepted for upload and training
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|&e| e == ext.to_string_lossy()))
        .unwrap_or(false)
}

/// Lists the class folders directly under a dataset directory.
///
/// Folders are sorted by name, the same order the training pipeline assigns
/// class indices in. Hidden folders are skipped with a warning naming them.
pub fn scan_dataset(dataset: &Path) -> Result<Vec<ClassFolder>> {
    let (classes, hidden) = list_folders(dataset)?;
    if !hidden.is_empty() {
        log::warn!(
            "skipped hidden folders {:?} in {}; a model trained on this directory may count them as classes, shifting every later index",
            hidden,
            dataset.display()
        );
    }
    Ok(classes)
}

/// Names of the dot-folders `scan_dataset` leaves out, sorted
pub fn hidden_folders(dataset: &Path) -> Result<Vec<String>> {
    list_folders(dataset).map(|(_, hidden)| hidden)
}

fn list_folders(dataset: &Path) -> Result<(Vec<ClassFolder>, Vec<String>)> {
    if !dataset.is_dir() {
        return Err(PlantAiError::FolderNotFound(dataset.display().to_string()));
    }

    let mut classes = Vec::new();
    let mut hidden = Vec::new();

    for entry in WalkDir::new(dataset)
        .min_depth(1)
        .max_depth(1)  // class folders only
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        // .git, .ipynb_checkpoints
        if name.starts_with('.') {
            hidden.push(name);
            continue;
        }

        let image_count = count_images(entry.path());
        classes.push(ClassFolder {
            path: entry.path().to_path_buf(),
            name,
            image_count,
        });
    }

    classes.sort_by(|a, b| a.name.cmp(&b.name));
    hidden.sort();

    Ok((classes, hidden))
}

/// Label catalog in class-folder order, as the trained network sees it
pub fn build_catalog(dataset: &Path) -> Result<LabelCatalog> {
    let classes = scan_dataset(dataset)?;
    for class in classes.iter().filter(|c| c.image_count == 0) {
        log::warn!("class folder '{}' has no images", class.name);
    }

    Ok(LabelCatalog::from_class_names(classes.iter().map(|c| c.name.as_str()))?)
}

fn count_images(folder: &Path) -> usize {
    WalkDir::new(folder)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_image_file(e.path()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("leaf.jpg")));
        assert!(is_image_file(Path::new("leaf.JPG")));
        assert!(is_image_file(Path::new("leaf.jpeg")));
        assert!(is_image_file(Path::new("leaf.png")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("leaf.gif")));
        assert!(!is_image_file(Path::new("leaf")));
    }

    #[test]
    fn test_scan_dataset_not_found() {
        let result = scan_dataset(Path::new("/nonexistent/dataset"));
        assert!(matches!(result, Err(PlantAiError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_dataset_sorted_classes() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Tomato___healthy", "Apple___Apple_scab", "Tomato___Early_blight", ".cache"] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
        }
        File::create(dir.path().join("Apple___Apple_scab").join("a.jpg")).unwrap();
        File::create(dir.path().join("Apple___Apple_scab").join("b.png")).unwrap();
        File::create(dir.path().join("Apple___Apple_scab").join("readme.txt")).unwrap();
        File::create(dir.path().join("labels.csv")).unwrap();

        let classes = scan_dataset(dir.path()).unwrap();
        let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Apple___Apple_scab", "Tomato___Early_blight", "Tomato___healthy"]
        );
        assert_eq!(classes[0].image_count, 2);
        assert_eq!(classes[1].image_count, 0);
    }

    #[test]
    fn test_hidden_folders_reported() {
        let dir = tempfile::tempdir().unwrap();
        for name in [".ipynb_checkpoints", "Tomato___healthy", ".cache"] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
        }
        File::create(dir.path().join(".DS_Store")).unwrap();

        assert_eq!(
            hidden_folders(dir.path()).unwrap(),
            vec![".cache".to_string(), ".ipynb_checkpoints".to_string()]
        );
        let catalog = build_catalog(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_hidden_folders_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Apple___Apple_scab")).unwrap();
        assert!(hidden_folders(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_build_catalog() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Tomato___Late_blight", "Apple___Apple_scab"] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
        }

        let catalog = build_catalog(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.label_for(0).unwrap().as_str(), "apple_apple_scab");
        assert_eq!(catalog.label_for(1).unwrap().as_str(), "tomato_late_blight");
    }

    #[test]
    fn test_build_catalog_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            build_catalog(dir.path()),
            Err(PlantAiError::Common(plant_disease_common::Error::InvalidCatalog(_)))
        ));
    }
}
