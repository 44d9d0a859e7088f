//! Normalization of raw build models into Omni models.

use omni_model::{
    normalize, preorder, RawAttribute, RawEclipseModel, RawEclipseProject, RawExternalDependency,
    RawFailure, RawFailureKind, RawModuleVersion, RawProjectDependency, RawSourceDirectory,
    RawTaskSelector,
};
use std::path::PathBuf;

fn modern_source_dir() -> RawSourceDirectory {
    RawSourceDirectory {
        directory: PathBuf::from("/ws/app/src/main/java"),
        path: "src/main/java".to_string(),
        excludes: RawAttribute::Value(vec!["**/gen/**".to_string()]),
        includes: RawAttribute::Value(Vec::new()),
        output: RawAttribute::Value(Some("bin/main".to_string())),
        classpath_attributes: RawAttribute::Value(Vec::new()),
        access_rules: RawAttribute::Value(Vec::new()),
    }
}

fn app_build() -> RawEclipseModel {
    let mut model = RawEclipseModel::new();
    let mut root = RawEclipseProject::new("app", ":", "/ws/app");
    root.description = Some("the app".to_string());
    root.source_directories.push(modern_source_dir());
    root.task_selectors = RawAttribute::Value(vec![RawTaskSelector {
        name: "build".to_string(),
        description: Some("Assembles and tests".to_string()),
        public: true,
        selected_task_paths: vec![":web:build".to_string(), ":core:build".to_string()],
    }]);
    let root = model.add_project(root, None);

    let mut core = RawEclipseProject::new("core", ":core", "/ws/app/core");
    core.external_dependencies.push(RawExternalDependency {
        file: PathBuf::from("/cache/guava-33.0.jar"),
        source: None,
        javadoc: None,
        exported: false,
        gradle_module_version: RawAttribute::Value(Some(RawModuleVersion {
            group: "com.google.guava".to_string(),
            name: "guava".to_string(),
            version: "33.0".to_string(),
        })),
        classpath_attributes: RawAttribute::Unsupported,
        access_rules: RawAttribute::Unsupported,
    });
    model.add_project(core, Some(root));

    let mut web = RawEclipseProject::new("web", ":web", "/ws/app/web");
    web.project_dependencies.push(RawProjectDependency {
        path: ":core".to_string(),
        exported: true,
    });
    model.add_project(web, Some(root));
    model
}

#[test]
fn normalizes_whole_tree_in_order() {
    let model = app_build();
    let root = normalize(&model, omni_model::RawProjectId(0)).unwrap();

    let paths: Vec<String> = preorder(&root).iter().map(|p| p.path.clone()).collect();
    assert_eq!(paths, vec![":", ":core", ":web"]);
    assert_eq!(root.description.as_deref(), Some("the app"));
    assert_eq!(root.children[0].parent_path.as_deref(), Some(":"));
    assert_eq!(
        root.children[1].project_dependencies[0].target_project_path,
        ":core"
    );
}

#[test]
fn supported_attributes_keep_their_values() {
    let root = normalize(&app_build(), omni_model::RawProjectId(0)).unwrap();
    let dir = &root.source_directories[0];
    assert_eq!(dir.excludes, Some(vec!["**/gen/**".to_string()]));
    assert_eq!(dir.includes, Some(Vec::new()));
    assert_eq!(dir.output.as_deref(), Some("bin/main"));

    let dep = &root.children[0].external_dependencies[0];
    assert_eq!(dep.gradle_module_version.as_ref().unwrap().name, "guava");
    assert_eq!(dep.file_name(), Some("guava-33.0.jar"));
}

#[test]
fn unsupported_attributes_normalize_to_absent_not_default() {
    let mut model = RawEclipseModel::new();
    let mut project = RawEclipseProject::new("legacy", ":", "/ws/legacy");
    project
        .source_directories
        .push(RawSourceDirectory::new("/ws/legacy/src", "src"));
    model.add_project(project, None);

    let root = normalize(&model, omni_model::RawProjectId(0)).unwrap();
    let dir = &root.source_directories[0];
    assert_eq!(dir.excludes, None);
    assert_eq!(dir.includes, None);
    assert_eq!(dir.output, None);
    assert_eq!(dir.classpath_attributes, None);
    assert_eq!(dir.access_rules, None);
    assert_eq!(root.task_selectors, None);
}

#[test]
fn task_selector_paths_are_sorted() {
    let root = normalize(&app_build(), omni_model::RawProjectId(0)).unwrap();
    let selectors = root.task_selectors.as_ref().unwrap();
    let paths: Vec<&String> = selectors[0].selected_task_paths.iter().collect();
    assert_eq!(paths, vec![":core:build", ":web:build"]);
    assert!(selectors[0].selects(":web:build"));
    assert!(selectors[0].is_public);
}

#[test]
fn failed_attribute_read_propagates() {
    let mut model = app_build();
    let failure = RawFailure::new(RawFailureKind::Connection, "daemon disappeared");
    model.projects[2].task_selectors = RawAttribute::Failed(failure.clone());

    let err = normalize(&model, omni_model::RawProjectId(0)).unwrap_err();
    assert_eq!(err, failure);
}

#[test]
fn normalizing_a_subproject_keeps_parent_path() {
    let model = app_build();
    let web = model.find_by_directory(std::path::Path::new("/ws/app/web")).unwrap();
    let node = normalize(&model, web).unwrap();
    assert_eq!(node.parent_path.as_deref(), Some(":"));
    assert!(!node.is_root());
}
