//! Common test utilities for integration tests.
//!
//! Fixture sources and small helpers shared across integration test files.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::fs;
use std::path::{Path, PathBuf};

use bugforge_core::{extract_entities, CodeEntity, SupportedLanguage};
use tempfile::TempDir;

/// Extract every entity of `source`, parsed as `language`.
pub fn entities(language: SupportedLanguage, file_name: &str, source: &str) -> Vec<CodeEntity> {
    extract_entities(language.adapter(), Path::new(file_name), source, None)
}

/// The entity called `name`; panics with the available names otherwise.
pub fn entity_named(
    language: SupportedLanguage,
    file_name: &str,
    source: &str,
    name: &str,
) -> CodeEntity {
    let all = entities(language, file_name, source);
    let names: Vec<String> = all.iter().map(|e| e.name().to_string()).collect();
    all.into_iter()
        .find(|e| e.name() == name)
        .unwrap_or_else(|| panic!("no entity named {name}; found {names:?}"))
}

/// Write `files` into a fresh temporary directory.
pub fn write_tree(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().expect("create temp dir");
    let mut paths = Vec::new();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, content).expect("write fixture");
        paths.push(path);
    }
    (dir, paths)
}

/// One small, well-formed source file per language.
pub const FIXTURES: &[(SupportedLanguage, &str, &str)] = &[
    (
        SupportedLanguage::Python,
        "shapes.py",
        "import math\n\n\nclass Circle(Shape):\n    def __init__(self, r):\n        self.r = r\n\n    def area(self):\n        if self.r < 0:\n            raise ValueError(\"negative\")\n        else:\n            return math.pi * self.r ** 2\n\n\ndef total(shapes):\n    t = 0\n    for s in shapes:\n        t += s.area()\n    return t\n",
    ),
    (
        SupportedLanguage::JavaScript,
        "shapes.js",
        "class Circle extends Shape {\n  area() {\n    return Math.PI * this.r * this.r;\n  }\n}\n\nfunction total(shapes) {\n  let t = 0;\n  for (const s of shapes) {\n    t += s.area();\n  }\n  return t;\n}\n\nconst double = (x) => {\n  return x * 2;\n};\n",
    ),
    (
        SupportedLanguage::TypeScript,
        "shapes.ts",
        "interface Sized {\n  size(): number;\n}\n\nclass Circle extends Shape implements Sized {\n  size(): number {\n    return this.r * 2;\n  }\n}\n\nfunction total(xs: number[]): number {\n  let t = 0;\n  for (const x of xs) {\n    t += x;\n  }\n  return t;\n}\n",
    ),
    (
        SupportedLanguage::Rust,
        "shapes.rs",
        "struct Circle {\n    r: f64,\n}\n\nimpl Circle {\n    fn area(&self) -> f64 {\n        3.14 * self.r * self.r\n    }\n}\n\nfn total(xs: &[f64]) -> f64 {\n    let mut t = 0.0;\n    for x in xs {\n        t += x;\n    }\n    t\n}\n",
    ),
    (
        SupportedLanguage::Go,
        "shapes.go",
        "package shapes\n\ntype Circle struct {\n\tr float64\n}\n\nfunc (c *Circle) Area() float64 {\n\treturn 3.14 * c.r * c.r\n}\n\nfunc Total(xs []float64) float64 {\n\tt := 0.0\n\tfor _, x := range xs {\n\t\tt += x\n\t}\n\treturn t\n}\n",
    ),
    (
        SupportedLanguage::C,
        "shapes.c",
        "#include <stddef.h>\n\ndouble total(const double *xs, size_t n) {\n    double t = 0;\n    for (size_t i = 0; i < n; i++) {\n        t += xs[i];\n    }\n    return t;\n}\n",
    ),
    (
        SupportedLanguage::Cpp,
        "shapes.cpp",
        "class Circle : public Shape {\npublic:\n    double area() const {\n        return 3.14 * r * r;\n    }\n\nprivate:\n    double r;\n};\n\ndouble total(const std::vector<double> &xs) {\n    double t = 0;\n    for (double x : xs) {\n        t += x;\n    }\n    return t;\n}\n",
    ),
    (
        SupportedLanguage::CSharp,
        "Shapes.cs",
        "public class Circle : Shape {\n    private double r;\n\n    public double Area() {\n        return 3.14 * r * r;\n    }\n}\n",
    ),
    (
        SupportedLanguage::Java,
        "Circle.java",
        "public class Circle extends Shape {\n    private double r;\n\n    public double area() {\n        return 3.14 * r * r;\n    }\n}\n",
    ),
    (
        SupportedLanguage::Php,
        "shapes.php",
        "<?php\n\nclass Circle extends Shape\n{\n    public function area()\n    {\n        return 3.14 * $this->r * $this->r;\n    }\n}\n\nfunction total($xs)\n{\n    $t = 0;\n    foreach ($xs as $x) {\n        $t += $x;\n    }\n    return $t;\n}\n",
    ),
    (
        SupportedLanguage::Ruby,
        "shapes.rb",
        "class Circle < Shape\n  def area\n    3.14 * @r * @r\n  end\nend\n\ndef total(xs)\n  t = 0\n  xs.each do |x|\n    t += x\n  end\n  t\nend\n",
    ),
];
