use std::io::Write;
use std::path::Path;

use tplg_build::{BuildReport, Builder};
use tplg_store::{Element, ElementKey, ElementStore, Growth, Payload, TextTable};
use tplg_tuple::{TokenTable, TupleTable};
use tplg_types::wire::{CtlTlv, DbScale, HwConfig, Stream, StreamCaps};
use tplg_types::ElementType;
use tplg_writer::{TopologyImage, TopologyWriter};
use tracing::{debug, info};

use crate::config::CompilerConfig;
use crate::error::{TplgError, TplgResult};
use crate::template::{
    BytesTemplate, DataSource, DataTemplate, EnumTemplate, LinkTemplate, MixerTemplate,
    PcmTemplate, RouteTemplate, WidgetTemplate,
};

/// A topology under construction.
///
/// Elements are added through the template API (or the section loader,
/// which uses the same calls), then [`Project::build`] binds references and
/// the `write_*` methods serialize the result.
pub struct Project {
    config: CompilerConfig,
    store: ElementStore,
    routes: usize,
    report: Option<BuildReport>,
}

impl Project {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            store: ElementStore::new(),
            routes: 0,
            report: None,
        }
    }

    fn insert(&mut self, element: Element) -> TplgResult<ElementKey> {
        let key = self.store.insert(element)?;
        self.report = None;
        Ok(key)
    }

    // ---- Controls ----

    pub fn add_tlv(&mut self, name: &str, scale: DbScale) -> TplgResult<ElementKey> {
        self.insert(Element::with_payload(name, Payload::Tlv(CtlTlv::db_scale(scale))))
    }

    pub fn add_text(&mut self, name: &str, values: Vec<String>) -> TplgResult<ElementKey> {
        self.insert(Element::with_payload(name, Payload::Text(TextTable { values })))
    }

    pub fn add_mixer(&mut self, template: MixerTemplate) -> TplgResult<ElementKey> {
        self.insert(template.into_element()?)
    }

    pub fn add_enum(&mut self, template: EnumTemplate) -> TplgResult<ElementKey> {
        self.insert(template.into_element()?)
    }

    pub fn add_bytes(&mut self, template: BytesTemplate) -> TplgResult<ElementKey> {
        self.insert(template.into_element()?)
    }

    // ---- Private data ----

    /// Add a data element. Literal bytes over the private data cap are
    /// rejected here, before any build runs. Tuple tables are inlined by the
    /// build at the position they were declared in.
    pub fn add_data(&mut self, template: DataTemplate) -> TplgResult<ElementKey> {
        let cap = self.config.private_cap();
        let literal = template.literal_len();
        if literal > cap {
            return Err(TplgError::MalformedPrivateData {
                id: template.name,
                reason: format!("{literal} bytes exceeds the {cap} byte limit"),
            });
        }
        let mut element = Element::new(ElementType::Data, template.name);
        element.vendor_type = template.vendor_type;
        let mut offset = 0;
        for source in template.sources {
            match source {
                DataSource::Bytes(bytes) => {
                    element.grow_and_append(&bytes, Growth::PrivateData)?;
                    offset += bytes.len();
                }
                DataSource::Tuples(tuples) => {
                    element.add_reference_at(ElementType::Tuple, tuples, offset);
                }
            }
        }
        self.insert(element)
    }

    pub fn add_tokens(&mut self, name: &str, tokens: TokenTable) -> TplgResult<ElementKey> {
        self.insert(Element::with_payload(name, Payload::Token(tokens)))
    }

    pub fn add_tuples(&mut self, name: &str, tuples: TupleTable) -> TplgResult<ElementKey> {
        self.insert(Element::with_payload(name, Payload::Tuple(tuples)))
    }

    /// Create the manifest, carrying the named data elements.
    pub fn set_manifest(&mut self, name: &str, data: Vec<String>) -> TplgResult<ElementKey> {
        let mut element = Element::new(ElementType::Manifest, name);
        for data in data {
            element.add_reference(ElementType::Data, data);
        }
        self.insert(element)
    }

    // ---- Widgets and routes ----

    pub fn add_widget(&mut self, template: WidgetTemplate) -> TplgResult<ElementKey> {
        self.insert(template.into_element())
    }

    /// Add a graph edge. Routes get generated ids (`route.0`, `route.1`,
    /// ...) in the order they are added.
    pub fn add_route(&mut self, template: RouteTemplate) -> TplgResult<ElementKey> {
        let id = format!("route.{}", self.routes);
        let key = self.insert(template.into_element(id))?;
        self.routes += 1;
        Ok(key)
    }

    // ---- Streams ----

    pub fn add_stream_caps(&mut self, caps: StreamCaps) -> TplgResult<ElementKey> {
        let name = caps.name.clone();
        self.insert(Element::with_payload(name, Payload::StreamCaps(caps)))
    }

    pub fn add_stream_config(&mut self, stream: Stream) -> TplgResult<ElementKey> {
        let name = stream.name.clone();
        self.insert(Element::with_payload(name, Payload::StreamConfig(stream)))
    }

    pub fn add_hw_config(&mut self, name: &str, config: HwConfig) -> TplgResult<ElementKey> {
        self.insert(Element::with_payload(name, Payload::HwConfig(config)))
    }

    pub fn add_pcm(&mut self, template: PcmTemplate) -> TplgResult<ElementKey> {
        self.insert(template.into_element())
    }

    pub fn add_link(&mut self, template: LinkTemplate) -> TplgResult<ElementKey> {
        self.insert(template.into_element())
    }

    // ---- Build and write ----

    /// Run the build pipeline over everything added so far.
    ///
    /// Calling it again without adding elements returns the previous
    /// report; every pass only acts on unresolved references, so the output
    /// would not change anyway.
    pub fn build(&mut self) -> TplgResult<&BuildReport> {
        let report = match self.report.take() {
            Some(report) => report,
            None => {
                let builder = Builder::with_default_passes(self.config.build_options());
                let report = builder.run(&mut self.store)?;
                info!(
                    elements = self.store.total_len(),
                    resolved = report.resolved(),
                    warnings = report.diagnostics.len(),
                    "topology built"
                );
                report
            }
        };
        Ok(self.report.insert(report))
    }

    /// Build if needed, then assemble the image in memory.
    pub fn to_image(&mut self) -> TplgResult<TopologyImage> {
        self.build()?;
        let writer = TopologyWriter::new(self.config.writer_options());
        Ok(writer.finish_to_bytes(&self.store)?)
    }

    pub fn to_bytes(&mut self) -> TplgResult<Vec<u8>> {
        Ok(self.to_image()?.bytes)
    }

    /// Build if needed, then write the image to `sink` in one write.
    pub fn write_to<W: Write>(&mut self, sink: &mut W) -> TplgResult<TopologyImage> {
        self.build()?;
        let writer = TopologyWriter::new(self.config.writer_options());
        Ok(writer.finish(&self.store, sink)?)
    }

    /// Build if needed, then write the image to `path`. Nothing is created
    /// when the build or the image verification fails.
    pub fn write_file(&mut self, path: &Path) -> TplgResult<TopologyImage> {
        self.build()?;
        let image = TopologyWriter::new(self.config.writer_options())
            .finish_to_bytes(&self.store)?;
        std::fs::write(path, &image.bytes).map_err(|source| TplgError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), size = image.len(), "topology written");
        Ok(image)
    }

    // ---- Accessors ----

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    /// Direct access to the elements. Any change invalidates the last
    /// build report.
    pub fn store_mut(&mut self) -> &mut ElementStore {
        self.report = None;
        &mut self.store
    }

    pub fn report(&self) -> Option<&BuildReport> {
        self.report.as_ref()
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}
