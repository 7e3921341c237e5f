//! ArcGIS item metadata (`<metadata><Esri>...<dataIdInfo>`)

use super::fgdc;
use super::path::{attr, first, select, text, texts};
use super::{
    BoundingBox, Contact, Dates, DigitalForm, LargerWork, ProcessStep, RasterInfo, XmlMetaSummary,
};
use roxmltree::Node;

pub(super) fn summarize(root: Node<'_, '_>) -> XmlMetaSummary {
    let ident = first(root, "dataIdInfo");
    let within = |path: &str| ident.and_then(|i| text(i, path));
    let all_within = |path: &str| ident.map(|i| texts(i, path)).unwrap_or_default();

    XmlMetaSummary {
        title: within("idCitation/resTitle"),
        abstract_text: within("idAbs"),
        place_keywords: all_within("placeKeys/keyword"),
        thematic_keywords: all_within("themeKeys/keyword"),
        attributes: fgdc::attributes(root),
        bounding_box: ident
            .and_then(|i| first(i, "dataExt/geoEle/GeoBndBox"))
            .map(|b| BoundingBox {
                east: text(b, "eastBL"),
                south: text(b, "southBL"),
                west: text(b, "westBL"),
                north: text(b, "northBL"),
            }),
        contacts: ident
            .map(|i| select(i, "idPoC"))
            .unwrap_or_default()
            .into_iter()
            .map(|poc| Contact {
                name: text(poc, "rpIndName"),
                organization: text(poc, "rpOrgName"),
                position: text(poc, "rpPosName"),
                email: text(poc, "rpCntInfo/cntAddress/eMailAdd"),
            })
            .collect(),
        dates: ident.and_then(dates),
        digital_forms: digital_forms(root),
        larger_works: ident
            .and_then(|i| first(i, "aggrInfo/aggrDSName"))
            .map(larger_work),
        process_steps: select(root, "dqInfo/dataLineage/prcStep")
            .into_iter()
            .map(|step| ProcessStep {
                description: text(step, "stepDesc"),
                date: text(step, "stepDateTm"),
                sources: texts(step, "stepSrc/srcDesc"),
            })
            .collect(),
        raster_info: raster_info(root),
    }
}

fn dates(ident: Node<'_, '_>) -> Option<Dates> {
    let extents = select(ident, "dataExt/tempEle/TempExtent/exTemp");
    if let Some(period) = extents.iter().find_map(|e| first(*e, "TM_Period")) {
        return Dates::range(text(period, "tmBegin"), text(period, "tmEnd"));
    }
    let instants = extents
        .iter()
        .flat_map(|e| texts(*e, "TM_Instant/tmPosition"))
        .collect();
    Dates::from_instants(instants)
}

// Formats and transfer options are parallel lists; pair them by position.
fn digital_forms(root: Node<'_, '_>) -> Vec<DigitalForm> {
    let formats = select(root, "distInfo/distFormat");
    let online = select(root, "distInfo/distTranOps/onLineSrc");
    let count = formats.len().max(online.len());
    (0..count)
        .map(|i| {
            let format = formats.get(i).copied();
            let source = online.get(i).copied();
            DigitalForm {
                name: format.and_then(|f| text(f, "formatName")),
                content: format.and_then(|f| text(f, "formatInfo")),
                decompression: format.and_then(|f| text(f, "fileDecmTech")),
                version: format.and_then(|f| text(f, "formatVer")),
                specification: format.and_then(|f| text(f, "formatSpec")),
                access_desc: source.and_then(|s| text(s, "orDesc")),
                access_instrs: source.and_then(|s| text(s, "orName")),
                network_resource: source.and_then(|s| text(s, "linkage")),
            }
        })
        .collect()
}

fn larger_work(cite: Node<'_, '_>) -> LargerWork {
    let parties = select(cite, "citRespParty");
    LargerWork {
        title: text(cite, "resTitle"),
        edition: text(cite, "resEd"),
        origin: parties
            .iter()
            .filter_map(|p| text(*p, "rpIndName").or_else(|| text(*p, "rpOrgName")))
            .collect(),
        online_linkage: text(cite, "citOnlineRes/linkage"),
        other_citation: text(cite, "otherCitDet"),
        publish_date: text(cite, "date/pubDate"),
        publish_place: parties
            .iter()
            .find_map(|p| text(*p, "rpCntInfo/cntAddress/city")),
        publish_info: parties.iter().find_map(|p| text(*p, "rpOrgName")),
    }
}

fn raster_info(root: Node<'_, '_>) -> Option<RasterInfo> {
    let grid = first(root, "spatRepInfo/GridSpatRep")?;
    let mut info = RasterInfo {
        dimensions: text(grid, "numDims"),
        ..RasterInfo::default()
    };
    for axis in select(grid, "axisDimension") {
        let size = text(axis, "dimSize");
        let resolution = text(axis, "dimResol/value").or_else(|| text(axis, "dimResol"));
        match axis.attribute("type").map(str::trim) {
            Some("001") => {
                info.row_count = size;
                info.y_resolution = resolution;
            }
            Some("002") => {
                info.column_count = size;
                info.x_resolution = resolution;
            }
            Some("003") => info.vertical_count = size,
            _ => {}
        }
    }
    // Some exports carry the code as a child element instead.
    if info.row_count.is_none() && info.column_count.is_none() {
        for axis in select(grid, "axisDimension") {
            match attr(axis, "dimName", "value").as_deref() {
                Some("001") => info.row_count = text(axis, "dimSize"),
                Some("002") => info.column_count = text(axis, "dimSize"),
                Some("003") => info.vertical_count = text(axis, "dimSize"),
                _ => {}
            }
        }
    }
    (!info.is_empty()).then_some(info)
}

#[cfg(test)]
mod tests {
    use super::super::{summarize_xml_meta, DateType};
    use pretty_assertions::assert_eq;

    const RECORD: &str = r#"<?xml version="1.0"?>
<metadata xml:lang="en">
  <Esri><CreaDate>20200101</CreaDate><ArcGISFormat>1.0</ArcGISFormat></Esri>
  <dataIdInfo>
    <idCitation>
      <resTitle>Wetland inventory</resTitle>
    </idCitation>
    <idAbs>Mapped wetlands of the valley.</idAbs>
    <idPoC>
      <rpIndName>Kim Park</rpIndName>
      <rpOrgName>Habitat Office</rpOrgName>
      <rpPosName>Ecologist</rpPosName>
      <rpCntInfo><cntAddress><eMailAdd>kpark@example.gov</eMailAdd></cntAddress></rpCntInfo>
    </idPoC>
    <placeKeys><keyword>Central Valley</keyword></placeKeys>
    <themeKeys><keyword>wetlands</keyword><keyword>habitat</keyword></themeKeys>
    <aggrInfo><aggrDSName>
      <resTitle>Statewide habitat series</resTitle>
      <resEd>3</resEd>
      <citRespParty><rpOrgName>Habitat Office</rpOrgName></citRespParty>
      <date><pubDate>2019-06-01</pubDate></date>
    </aggrDSName></aggrInfo>
    <dataExt>
      <geoEle><GeoBndBox esriExtentType="search">
        <westBL>-122.5</westBL><eastBL>-119.0</eastBL><northBL>40.0</northBL><southBL>35.0</southBL>
      </GeoBndBox></geoEle>
      <tempEle><TempExtent><exTemp><TM_Period><tmBegin>2012-01-01</tmBegin><tmEnd>2014-12-31</tmEnd></TM_Period></exTemp></TempExtent></tempEle>
    </dataExt>
  </dataIdInfo>
  <distInfo>
    <distFormat><formatName>File Geodatabase</formatName><formatVer>10.8</formatVer><fileDecmTech>ZIP</fileDecmTech></distFormat>
    <distTranOps><onLineSrc><linkage>https://example.gov/wetlands.zip</linkage><orName>Download</orName></onLineSrc></distTranOps>
  </distInfo>
  <dqInfo><dataLineage>
    <prcStep><stepDesc>Digitized from imagery.</stepDesc><stepDateTm>2015-02-01</stepDateTm><stepSrc><srcDesc>NAIP 2014</srcDesc></stepSrc></prcStep>
  </dataLineage></dqInfo>
  <spatRepInfo><GridSpatRep>
    <numDims>2</numDims>
    <axisDimension type="001"><dimSize>1200</dimSize><dimResol><value uom="m">5</value></dimResol></axisDimension>
    <axisDimension type="002"><dimSize>900</dimSize><dimResol><value uom="m">5</value></dimResol></axisDimension>
  </GridSpatRep></spatRepInfo>
  <eainfo><detailed>
    <attr><attrlabl>wet_type</attrlabl><attrdef>Cowardin class</attrdef></attr>
  </detailed></eainfo>
</metadata>"#;

    #[test]
    fn test_arcgis_summary() {
        let summary = summarize_xml_meta(RECORD).unwrap();
        assert_eq!(summary.title.as_deref(), Some("Wetland inventory"));
        assert_eq!(summary.abstract_text.as_deref(), Some("Mapped wetlands of the valley."));
        assert_eq!(summary.place_keywords, vec!["Central Valley"]);
        assert_eq!(summary.thematic_keywords, vec!["wetlands", "habitat"]);
        assert_eq!(summary.attributes[0].label.as_deref(), Some("wet_type"));

        let bbox = summary.bounding_box.unwrap();
        assert_eq!(bbox.west.as_deref(), Some("-122.5"));
        assert_eq!(bbox.north.as_deref(), Some("40.0"));

        let contact = &summary.contacts[0];
        assert_eq!(contact.name.as_deref(), Some("Kim Park"));
        assert_eq!(contact.position.as_deref(), Some("Ecologist"));
        assert_eq!(contact.email.as_deref(), Some("kpark@example.gov"));

        let dates = summary.dates.unwrap();
        assert_eq!(dates.date_type, DateType::Range);
        assert_eq!(dates.values, vec!["2012-01-01", "2014-12-31"]);

        let form = &summary.digital_forms[0];
        assert_eq!(form.name.as_deref(), Some("File Geodatabase"));
        assert_eq!(form.decompression.as_deref(), Some("ZIP"));
        assert_eq!(form.access_instrs.as_deref(), Some("Download"));
        assert_eq!(form.network_resource.as_deref(), Some("https://example.gov/wetlands.zip"));

        let larger = summary.larger_works.unwrap();
        assert_eq!(larger.title.as_deref(), Some("Statewide habitat series"));
        assert_eq!(larger.edition.as_deref(), Some("3"));
        assert_eq!(larger.publish_date.as_deref(), Some("2019-06-01"));

        assert_eq!(summary.process_steps[0].sources, vec!["NAIP 2014"]);

        let raster = summary.raster_info.unwrap();
        assert_eq!(raster.dimensions.as_deref(), Some("2"));
        assert_eq!(raster.row_count.as_deref(), Some("1200"));
        assert_eq!(raster.column_count.as_deref(), Some("900"));
        assert_eq!(raster.x_resolution.as_deref(), Some("5"));
        assert_eq!(raster.vertical_count, None);
    }

    #[test]
    fn test_arcgis_without_identification() {
        let summary = summarize_xml_meta("<metadata><Esri/></metadata>").unwrap();
        assert_eq!(summary.title, None);
        assert!(summary.contacts.is_empty());
        assert!(summary.dates.is_none());
        assert!(summary.raster_info.is_none());
    }
}
