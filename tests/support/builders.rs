//! Builders for exploded and packed enterprise archives

use skinny_ear::ModuleKind;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// One module inside a test ear
#[derive(Debug, Clone)]
pub struct ModuleFixture {
    pub name: String,
    pub kind: ModuleKind,
    pub packed: bool,
    pub libraries: Vec<(String, Vec<u8>)>,
    pub manifest: Option<String>,
}

impl ModuleFixture {
    pub fn new(name: &str, kind: ModuleKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            packed: false,
            libraries: Vec::new(),
            manifest: None,
        }
    }

    pub fn war(name: &str) -> Self {
        Self::new(name, ModuleKind::Web)
    }

    pub fn ejb(name: &str) -> Self {
        Self::new(name, ModuleKind::Ejb)
    }

    pub fn rar(name: &str) -> Self {
        Self::new(name, ModuleKind::ResourceAdapter)
    }

    /// Adds libraries whose content is their own name
    pub fn libraries(mut self, names: &[&str]) -> Self {
        for name in names {
            self.libraries
                .push((name.to_string(), name.as_bytes().to_vec()));
        }
        self
    }

    pub fn library_with(mut self, name: &str, content: &str) -> Self {
        self.libraries
            .push((name.to_string(), content.as_bytes().to_vec()));
        self
    }

    pub fn manifest(mut self, content: &str) -> Self {
        self.manifest = Some(content.to_string());
        self
    }

    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    fn library_dir(&self) -> &'static str {
        self.kind.default_library_dir()
    }

    fn write_into(&self, parent: &Path) {
        let staging = if self.packed {
            parent.join(format!(".{}.staging", self.name))
        } else {
            parent.join(&self.name)
        };
        std::fs::create_dir_all(&staging).unwrap();

        match self.kind {
            ModuleKind::Web => write_file(&staging.join("WEB-INF/web.xml"), b"<web-app/>"),
            ModuleKind::Ejb => write_file(&staging.join("META-INF/ejb-jar.xml"), b"<ejb-jar/>"),
            ModuleKind::ResourceAdapter => {
                write_file(&staging.join("META-INF/ra.xml"), b"<connector/>")
            }
            ModuleKind::Ear => {}
        }
        for (name, content) in &self.libraries {
            write_file(&staging.join(self.library_dir()).join(name), content);
        }
        if let Some(manifest) = &self.manifest {
            write_file(&staging.join("META-INF/MANIFEST.MF"), manifest.as_bytes());
        }

        if self.packed {
            zip_dir(&staging, &parent.join(&self.name));
            std::fs::remove_dir_all(&staging).unwrap();
        }
    }
}

/// Builder for an enterprise archive on disk
#[derive(Debug, Clone)]
pub struct EarBuilder {
    name: String,
    libraries: Vec<(String, Vec<u8>)>,
    modules: Vec<ModuleFixture>,
    descriptor: Option<String>,
    extra_files: Vec<(String, Vec<u8>)>,
    packed: bool,
}

impl EarBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            libraries: Vec::new(),
            modules: Vec::new(),
            descriptor: None,
            extra_files: Vec::new(),
            packed: false,
        }
    }

    pub fn ear_library(mut self, name: &str) -> Self {
        self.libraries
            .push((name.to_string(), name.as_bytes().to_vec()));
        self
    }

    pub fn module(mut self, module: ModuleFixture) -> Self {
        self.modules.push(module);
        self
    }

    pub fn war(self, name: &str, libraries: &[&str]) -> Self {
        self.module(ModuleFixture::war(name).libraries(libraries))
    }

    pub fn ejb(self, name: &str, libraries: &[&str]) -> Self {
        self.module(ModuleFixture::ejb(name).libraries(libraries))
    }

    pub fn descriptor(mut self, xml: &str) -> Self {
        self.descriptor = Some(xml.to_string());
        self
    }

    pub fn file(mut self, relative: &str, content: &str) -> Self {
        self.extra_files
            .push((relative.to_string(), content.as_bytes().to_vec()));
        self
    }

    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    /// Writes the ear under `dir` and returns its path
    pub fn build(&self, dir: &Path) -> PathBuf {
        let target = dir.join(&self.name);
        let root = if self.packed {
            dir.join(format!(".{}.staging", self.name))
        } else {
            target.clone()
        };
        std::fs::create_dir_all(root.join("META-INF")).unwrap();
        write_file(
            &root.join("META-INF/application.xml"),
            b"<application/>",
        );

        for (name, content) in &self.libraries {
            write_file(&root.join("lib").join(name), content);
        }
        for module in &self.modules {
            module.write_into(&root);
        }
        if let Some(xml) = &self.descriptor {
            write_file(&root.join("META-INF/weblogic-application.xml"), xml.as_bytes());
        }
        for (relative, content) in &self.extra_files {
            write_file(&root.join(relative), content);
        }

        if self.packed {
            zip_dir(&root, &target);
            std::fs::remove_dir_all(&root).unwrap();
        }
        target
    }
}

pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Packs every file below `src` into a zip at `dest`
pub fn zip_dir(src: &Path, dest: &Path) {
    let mut zip = ZipWriter::new(File::create(dest).unwrap());
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.unwrap();
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(src)
            .unwrap()
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/");
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&std::fs::read(entry.path()).unwrap()).unwrap();
    }
    zip.finish().unwrap();
}
