//! FGDC CSDGM records (`<metadata><idinfo>...`)

use super::path::{first, select, text, texts};
use super::{
    Attribute, BoundingBox, Contact, Dates, DigitalForm, LargerWork, ProcessStep, RasterInfo,
    XmlMetaSummary,
};
use roxmltree::Node;

pub(super) fn summarize(root: Node<'_, '_>) -> XmlMetaSummary {
    XmlMetaSummary {
        title: text(root, "idinfo/citation/citeinfo/title"),
        abstract_text: text(root, "idinfo/descript/abstract"),
        place_keywords: texts(root, "idinfo/keywords/place/placekey"),
        thematic_keywords: texts(root, "idinfo/keywords/theme/themekey"),
        attributes: attributes(root),
        bounding_box: first(root, "idinfo/spdom/bounding").map(|b| BoundingBox {
            east: text(b, "eastbc"),
            south: text(b, "southbc"),
            west: text(b, "westbc"),
            north: text(b, "northbc"),
        }),
        contacts: select(root, "idinfo/ptcontac/cntinfo")
            .into_iter()
            .map(contact)
            .collect(),
        dates: dates(root),
        digital_forms: select(root, "distinfo/stdorder/digform")
            .into_iter()
            .map(digital_form)
            .collect(),
        larger_works: first(root, "idinfo/citation/citeinfo/lworkcit/citeinfo").map(larger_work),
        process_steps: select(root, "dataqual/lineage/procstep")
            .into_iter()
            .map(|step| ProcessStep {
                description: text(step, "procdesc"),
                date: text(step, "procdate"),
                sources: texts(step, "srcused"),
            })
            .collect(),
        raster_info: raster_info(root),
    }
}

/// Entity attributes; ArcGIS records embed the same `eainfo` section.
pub(super) fn attributes(root: Node<'_, '_>) -> Vec<Attribute> {
    select(root, "eainfo/detailed/attr")
        .into_iter()
        .map(|attr| Attribute {
            label: text(attr, "attrlabl"),
            aliases: text(attr, "attalias"),
            definition: text(attr, "attrdef"),
            definition_source: text(attr, "attrdefs"),
        })
        .collect()
}

// Person-primary and organization-primary contacts share the same leaves.
fn contact(info: Node<'_, '_>) -> Contact {
    Contact {
        name: text(info, "cntperp/cntper").or_else(|| text(info, "cntorgp/cntper")),
        organization: text(info, "cntperp/cntorg").or_else(|| text(info, "cntorgp/cntorg")),
        position: text(info, "cntpos"),
        email: text(info, "cntemail"),
    }
}

fn dates(root: Node<'_, '_>) -> Option<Dates> {
    let timeinfo = first(root, "idinfo/timeperd/timeinfo")?;
    if let Some(range) = first(timeinfo, "rngdates") {
        return Dates::range(text(range, "begdate"), text(range, "enddate"));
    }
    let mut values = texts(timeinfo, "sngdate/caldate");
    values.extend(texts(timeinfo, "mdattim/sngdate/caldate"));
    Dates::from_instants(values)
}

fn digital_form(form: Node<'_, '_>) -> DigitalForm {
    DigitalForm {
        name: text(form, "digtinfo/formname"),
        content: text(form, "digtinfo/formcont"),
        decompression: text(form, "digtinfo/filedec"),
        version: text(form, "digtinfo/formvern"),
        specification: text(form, "digtinfo/formspec"),
        access_desc: text(form, "digtopt/onlinopt/oncomp"),
        access_instrs: text(form, "digtopt/onlinopt/accinstr"),
        network_resource: text(form, "digtopt/onlinopt/computer/networka/networkr"),
    }
}

fn larger_work(cite: Node<'_, '_>) -> LargerWork {
    LargerWork {
        title: text(cite, "title"),
        edition: text(cite, "edition"),
        origin: texts(cite, "origin"),
        online_linkage: text(cite, "onlink"),
        other_citation: text(cite, "othercit"),
        publish_date: text(cite, "pubdate"),
        publish_place: text(cite, "pubinfo/pubplace"),
        publish_info: text(cite, "pubinfo/publish"),
    }
}

fn raster_info(root: Node<'_, '_>) -> Option<RasterInfo> {
    let raster = first(root, "spdoinfo/rastinfo");
    let coordrep = first(root, "spref/horizsys/planar/planci/coordrep");
    let info = RasterInfo {
        dimensions: raster.and_then(|r| text(r, "rasttype")),
        row_count: raster.and_then(|r| text(r, "rowcount")),
        column_count: raster.and_then(|r| text(r, "colcount")),
        vertical_count: raster.and_then(|r| text(r, "vrtcount")),
        x_resolution: coordrep.and_then(|c| text(c, "absres")),
        y_resolution: coordrep.and_then(|c| text(c, "ordres")),
    };
    (!info.is_empty()).then_some(info)
}
