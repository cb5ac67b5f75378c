#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use eframe::egui;

use seo_meta::meta::{self, ExistingMetadata};
use seo_meta::packet::MAX_KEYWORDS;
use seo_meta::request::{self, ContainerFormat, ProcessResult, Submission};

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([980.0, 680.0])
        .with_min_inner_size([720.0, 480.0])
        .with_drag_and_drop(true);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "seo-meta",
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc)))),
    )
}

// ── Loaded image state ──────────────────────────────────────────────

struct LoadedImage {
    path: PathBuf,
    bytes: Vec<u8>,
    format: Option<ContainerFormat>,
    existing: ExistingMetadata,
    /// Texture handle for the preview.
    texture: Option<egui::TextureHandle>,
}

impl LoadedImage {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

// ── Main application state ──────────────────────────────────────────

struct App {
    image: Option<LoadedImage>,
    title: String,
    description: String,
    keywords: String,
    result: Option<ProcessResult>,
    status: String,
}

impl App {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            image: None,
            title: String::new(),
            description: String::new(),
            keywords: String::new(),
            result: None,
            status: "Ready — drop an image or click Open".into(),
        }
    }

    fn open_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png"])
            .pick_file()
        {
            self.load_path(path);
        }
    }

    fn load_path(&mut self, path: PathBuf) {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.status = format!("Could not read {}: {e}", path.display());
                return;
            }
        };

        let format = image::guess_format(&bytes)
            .ok()
            .map(ContainerFormat::from_image_format);
        let existing = meta::read_metadata(&path).unwrap_or_default();

        self.image = Some(LoadedImage {
            path,
            bytes,
            format,
            existing,
            texture: None,
        });
        self.result = None;
        self.status = format!(
            "Loaded {}",
            self.image.as_ref().map(LoadedImage::file_name).unwrap_or_default()
        );
    }

    fn clear(&mut self) {
        self.image = None;
        self.result = None;
        self.title.clear();
        self.description.clear();
        self.keywords.clear();
        self.status = "Ready — drop an image or click Open".into();
    }

    fn fields_filled(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
            && !self.keywords.trim().is_empty()
    }

    /// Number of keyword tokens the current field would produce.
    fn keyword_count(&self) -> usize {
        seo_meta::packet::split_keywords(&self.keywords)
            .iter()
            .filter(|k| !k.trim().is_empty())
            .count()
    }

    fn embed_and_save(&mut self) {
        let Some(ref img) = self.image else { return };

        if !self.fields_filled() {
            self.status = "Fill in title, description, and keywords before saving".into();
            return;
        }

        let result = request::process(Submission {
            file_name: img.file_name(),
            bytes: img.bytes.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            keywords: self.keywords.clone(),
        });

        if let Some(ref err) = result.error {
            self.status = format!("Error: {err}");
            self.result = Some(result);
            return;
        }

        let Some(ref output) = result.output else {
            self.status = "Error: no output produced".into();
            self.result = Some(result);
            return;
        };

        if let Some(dest) = rfd::FileDialog::new()
            .set_file_name(&result.download_name)
            .save_file()
        {
            match std::fs::write(&dest, output) {
                Ok(()) => self.status = format!("Saved {}", dest.display()),
                Err(e) => self.status = format!("Could not save {}: {e}", dest.display()),
            }
        } else {
            self.status = "Save cancelled".into();
        }

        self.result = Some(result);
    }

    fn load_texture(ctx: &egui::Context, entry: &mut LoadedImage) {
        if entry.texture.is_some() {
            return;
        }
        if let Ok(img) = image::load_from_memory(&entry.bytes) {
            let img = img.thumbnail(480, 480);
            let size = [img.width() as usize, img.height() as usize];
            let rgba = img.to_rgba8();
            let pixels = rgba.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            entry.texture = Some(ctx.load_texture(
                entry.path.to_string_lossy(),
                color_image,
                egui::TextureOptions::LINEAR,
            ));
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle dropped files — one image per request.
        let dropped: Option<PathBuf> = ctx.input(|i| {
            i.raw.dropped_files.iter().find_map(|f| f.path.clone())
        });
        if let Some(path) = dropped {
            self.load_path(path);
        }

        // ── Top bar ─────────────────────────────────────────────────
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("seo-meta");
                ui.separator();
                ui.label("Embed SEO metadata into JPEG and PNG images");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(&self.status);
                });
            });
        });

        // ── Bottom toolbar ──────────────────────────────────────────
        egui::TopBottomPanel::bottom("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui.button("📂 Open Image").clicked() {
                    self.open_file();
                }
                ui.separator();

                let can_submit = self.image.is_some() && self.fields_filled();
                if ui
                    .add_enabled(can_submit, egui::Button::new("💾 Embed & Save"))
                    .clicked()
                {
                    self.embed_and_save();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(self.image.is_some(), egui::Button::new("🗑 Clear"))
                        .clicked()
                    {
                        self.clear();
                    }
                });
            });
            ui.add_space(4.0);
        });

        // ── Left panel: preview + existing metadata ─────────────────
        egui::SidePanel::left("preview")
            .default_width(340.0)
            .min_width(240.0)
            .show(ctx, |ui| {
                if let Some(ref mut entry) = self.image {
                    Self::load_texture(ctx, entry);
                }

                let Some(ref entry) = self.image else {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new("Drop an image here\nor click Open")
                                .size(16.0)
                                .color(egui::Color32::GRAY),
                        );
                    });
                    return;
                };

                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.heading(entry.file_name());
                    match entry.format {
                        Some(ContainerFormat::Jpeg) => {
                            ui.label("JPEG — metadata goes into EXIF");
                        }
                        Some(ContainerFormat::Png) => {
                            ui.label("PNG — metadata goes into text chunks");
                        }
                        Some(ContainerFormat::Other) => {
                            ui.colored_label(
                                egui::Color32::from_rgb(200, 160, 40),
                                "Unsupported container — the file will be saved back unchanged",
                            );
                        }
                        None => {
                            ui.colored_label(
                                egui::Color32::from_rgb(220, 50, 50),
                                "Not recognized as an image",
                            );
                        }
                    }
                    ui.add_space(8.0);

                    if let Some(ref tex) = entry.texture {
                        let size = tex.size_vec2();
                        let max_w = ui.available_width();
                        let scale = (max_w / size.x).min(1.0);
                        ui.image(egui::load::SizedTexture::new(tex.id(), size * scale));
                    }

                    ui.add_space(8.0);
                    if !entry.existing.is_empty() {
                        Self::show_existing_metadata(ui, &entry.existing);
                    }
                });
            });

        // ── Central panel: the form + results ───────────────────────
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Metadata");
                ui.add_space(8.0);

                ui.label(egui::RichText::new("Title").strong());
                ui.add(
                    egui::TextEdit::singleline(&mut self.title)
                        .hint_text("Short, with the main keyword")
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(8.0);

                ui.label(egui::RichText::new("Description / Alt text").strong());
                ui.add(
                    egui::TextEdit::multiline(&mut self.description)
                        .hint_text("Describe the image; work keywords in naturally")
                        .desired_rows(3)
                        .desired_width(f32::INFINITY),
                );
                let chars = self.description.chars().count();
                ui.label(
                    egui::RichText::new(format!("{chars}/300 characters recommended"))
                        .small()
                        .color(if chars > 300 {
                            egui::Color32::from_rgb(200, 160, 40)
                        } else {
                            egui::Color32::GRAY
                        }),
                );
                ui.add_space(8.0);

                ui.label(egui::RichText::new("Keywords").strong());
                ui.add(
                    egui::TextEdit::multiline(&mut self.keywords)
                        .hint_text(format!(
                            "Up to {MAX_KEYWORDS} keywords, separated by commas or newlines"
                        ))
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                );
                let count = self.keyword_count();
                if count > MAX_KEYWORDS {
                    ui.colored_label(
                        egui::Color32::from_rgb(200, 160, 40),
                        format!("{count} keywords — only the first {MAX_KEYWORDS} will be kept"),
                    );
                } else {
                    ui.label(
                        egui::RichText::new(format!("{count} keywords"))
                            .small()
                            .color(egui::Color32::GRAY),
                    );
                }

                if let Some(ref result) = self.result {
                    ui.add_space(12.0);
                    ui.separator();
                    Self::show_result(ui, result);
                }
            });
        });
    }
}

impl App {
    fn show_existing_metadata(ui: &mut egui::Ui, data: &ExistingMetadata) {
        egui::CollapsingHeader::new(egui::RichText::new("Existing metadata").strong())
            .default_open(true)
            .show(ui, |ui| {
                egui::Grid::new("existing_metadata_grid")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for (label, value) in [
                            ("Title", data.title.as_deref()),
                            ("Description", data.description.as_deref()),
                            ("Keywords", data.keywords.as_deref()),
                        ] {
                            if let Some(val) = value {
                                ui.label(egui::RichText::new(label).strong());
                                ui.label(val);
                                ui.end_row();
                            }
                        }
                    });
            });
    }

    fn show_result(ui: &mut egui::Ui, result: &ProcessResult) {
        if let Some(ref err) = result.error {
            ui.colored_label(egui::Color32::from_rgb(220, 50, 50), format!("Error: {err}"));
            return;
        }

        ui.colored_label(
            egui::Color32::from_rgb(50, 180, 50),
            format!("✓ Metadata embedded — {}", result.download_name),
        );

        for warning in &result.warnings {
            ui.colored_label(egui::Color32::from_rgb(200, 160, 40), warning);
        }

        if let Some(ref packet) = result.packet {
            if !packet.keywords().is_empty() {
                ui.add_space(4.0);
                ui.label(egui::RichText::new("Keywords in the packet").strong());
                ui.horizontal_wrapped(|ui| {
                    for kw in packet.keywords() {
                        ui.label(
                            egui::RichText::new(kw)
                                .background_color(egui::Color32::from_rgb(60, 60, 80))
                                .color(egui::Color32::WHITE),
                        );
                    }
                });
            }
        }
    }
}
