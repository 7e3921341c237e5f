//! ISO 19115 / 19139 records (`gmd:MD_Metadata`, `gmi:MI_Metadata`)

use super::path::{attr, descendants, first, select, text, texts};
use super::{
    Attribute, BoundingBox, Contact, Dates, DigitalForm, LargerWork, ProcessStep, RasterInfo,
    XmlMetaSummary,
};
use roxmltree::Node;

const DISTRIBUTION: &str = "distributionInfo/MD_Distribution";
const ONLINE_RESOURCE: &str =
    "transferOptions/MD_DigitalTransferOptions/onLine/CI_OnlineResource";
const CONTACT_ADDRESS: &str = "contactInfo/CI_Contact/address/CI_Address";

pub(super) fn summarize(root: Node<'_, '_>) -> XmlMetaSummary {
    // Data or service identification, whichever the record carries first.
    let ident = first(root, "identificationInfo/*");
    let (place_keywords, thematic_keywords) = ident.map(keywords).unwrap_or_default();

    XmlMetaSummary {
        title: ident.and_then(|i| text(i, "citation/CI_Citation/title")),
        abstract_text: ident.and_then(|i| text(i, "abstract")),
        place_keywords,
        thematic_keywords,
        attributes: attributes(root),
        bounding_box: ident
            .and_then(|i| first(i, "extent/EX_Extent/geographicElement/EX_GeographicBoundingBox"))
            .map(|b| BoundingBox {
                east: text(b, "eastBoundLongitude"),
                south: text(b, "southBoundLatitude"),
                west: text(b, "westBoundLongitude"),
                north: text(b, "northBoundLatitude"),
            }),
        contacts: ident
            .map(|i| select(i, "pointOfContact/CI_ResponsibleParty"))
            .unwrap_or_default()
            .into_iter()
            .map(contact)
            .collect(),
        dates: ident.and_then(dates),
        digital_forms: digital_forms(root),
        larger_works: ident
            .and_then(|i| {
                first(
                    i,
                    "aggregationInfo/MD_AggregateInformation/aggregateDataSetName/CI_Citation",
                )
            })
            .map(larger_work),
        process_steps: select(
            root,
            "dataQualityInfo/DQ_DataQuality/lineage/LI_Lineage/processStep/LI_ProcessStep",
        )
        .into_iter()
        .map(|step| ProcessStep {
            description: text(step, "description"),
            date: text(step, "dateTime"),
            sources: texts(step, "source/LI_Source/description"),
        })
        .collect(),
        raster_info: raster_info(root),
    }
}

fn keywords(ident: Node<'_, '_>) -> (Vec<String>, Vec<String>) {
    let mut place = Vec::new();
    let mut theme = Vec::new();
    for group in select(ident, "descriptiveKeywords/MD_Keywords") {
        let kind = attr(group, "type/MD_KeywordTypeCode", "codeListValue")
            .or_else(|| text(group, "type/MD_KeywordTypeCode"));
        match kind.as_deref() {
            Some("place") => place.extend(texts(group, "keyword")),
            Some("theme") => theme.extend(texts(group, "keyword")),
            _ => {}
        }
    }
    (place, theme)
}

fn attributes(root: Node<'_, '_>) -> Vec<Attribute> {
    descendants(root, "FC_FeatureAttribute")
        .map(|a| Attribute {
            label: text(a, "memberName"),
            aliases: text(a, "aliases"),
            definition: text(a, "definition"),
            definition_source: text(a, "definitionReference"),
        })
        .collect()
}

fn contact(party: Node<'_, '_>) -> Contact {
    Contact {
        name: text(party, "individualName"),
        organization: text(party, "organisationName"),
        position: text(party, "positionName"),
        email: text(party, &format!("{CONTACT_ADDRESS}/electronicMailAddress")),
    }
}

fn dates(ident: Node<'_, '_>) -> Option<Dates> {
    let extents = select(
        ident,
        "extent/EX_Extent/temporalElement/EX_TemporalExtent/extent",
    );
    if let Some(period) = extents
        .iter()
        .find_map(|e| first(*e, "TimePeriod"))
    {
        let begin = text(period, "beginPosition").or_else(|| text(period, "begin"));
        let end = text(period, "endPosition").or_else(|| text(period, "end"));
        return Dates::range(begin, end);
    }
    let instants = extents
        .iter()
        .flat_map(|e| texts(*e, "TimeInstant/timePosition"))
        .collect();
    Dates::from_instants(instants)
}

// Formats and transfer options are parallel lists; pair them by position.
fn digital_forms(root: Node<'_, '_>) -> Vec<DigitalForm> {
    let formats = select(root, &format!("{DISTRIBUTION}/distributionFormat/MD_Format"));
    let online = select(root, &format!("{DISTRIBUTION}/{ONLINE_RESOURCE}"));
    let count = formats.len().max(online.len());
    (0..count)
        .map(|i| {
            let format = formats.get(i).copied();
            let resource = online.get(i).copied();
            DigitalForm {
                name: format.and_then(|f| text(f, "name")),
                content: None,
                decompression: format.and_then(|f| text(f, "fileDecompressionTechnique")),
                version: format.and_then(|f| text(f, "version")),
                specification: format.and_then(|f| text(f, "specification")),
                access_desc: resource.and_then(|r| text(r, "description")),
                access_instrs: resource.and_then(|r| text(r, "name")),
                network_resource: resource.and_then(|r| text(r, "linkage")),
            }
        })
        .collect()
}

fn larger_work(cite: Node<'_, '_>) -> LargerWork {
    let parties = select(cite, "citedResponsibleParty/CI_ResponsibleParty");
    LargerWork {
        title: text(cite, "title"),
        edition: text(cite, "edition"),
        origin: parties
            .iter()
            .filter_map(|p| text(*p, "individualName").or_else(|| text(*p, "organisationName")))
            .collect(),
        online_linkage: parties.iter().find_map(|p| {
            text(
                *p,
                "contactInfo/CI_Contact/onlineResource/CI_OnlineResource/linkage",
            )
        }),
        other_citation: text(cite, "otherCitationDetails"),
        publish_date: text(cite, "date/CI_Date/date"),
        publish_place: parties
            .iter()
            .find_map(|p| text(*p, &format!("{CONTACT_ADDRESS}/city"))),
        publish_info: parties.iter().find_map(|p| text(*p, "organisationName")),
    }
}

fn raster_info(root: Node<'_, '_>) -> Option<RasterInfo> {
    let grid = select(root, "spatialRepresentationInfo/*")
        .into_iter()
        .find(|g| first(*g, "axisDimensionProperties").is_some())?;

    let mut info = RasterInfo {
        dimensions: text(grid, "numberOfDimensions"),
        ..RasterInfo::default()
    };
    for dim in select(grid, "axisDimensionProperties/MD_Dimension") {
        let size = text(dim, "dimensionSize");
        let resolution = text(dim, "resolution");
        match attr(dim, "dimensionName/MD_DimensionNameTypeCode", "codeListValue").as_deref() {
            Some("row") => {
                info.row_count = size;
                info.y_resolution = resolution;
            }
            Some("column") => {
                info.column_count = size;
                info.x_resolution = resolution;
            }
            Some("vertical") => info.vertical_count = size,
            _ => {}
        }
    }
    (!info.is_empty()).then_some(info)
}

#[cfg(test)]
mod tests {
    use super::super::{summarize_xml_meta, DateType};
    use pretty_assertions::assert_eq;

    const RECORD: &str = r##"<gmi:MI_Metadata xmlns:gmi="http://www.isotc211.org/2005/gmi"
    xmlns:gmd="http://www.isotc211.org/2005/gmd" xmlns:gco="http://www.isotc211.org/2005/gco"
    xmlns:gml="http://www.opengis.net/gml/3.2">
  <gmd:spatialRepresentationInfo><gmd:MD_GridSpatialRepresentation>
    <gmd:numberOfDimensions><gco:Integer>2</gco:Integer></gmd:numberOfDimensions>
    <gmd:axisDimensionProperties><gmd:MD_Dimension>
      <gmd:dimensionName><gmd:MD_DimensionNameTypeCode codeList="#" codeListValue="row">row</gmd:MD_DimensionNameTypeCode></gmd:dimensionName>
      <gmd:dimensionSize><gco:Integer>512</gco:Integer></gmd:dimensionSize>
      <gmd:resolution><gco:Measure uom="m">10</gco:Measure></gmd:resolution>
    </gmd:MD_Dimension></gmd:axisDimensionProperties>
    <gmd:axisDimensionProperties><gmd:MD_Dimension>
      <gmd:dimensionName><gmd:MD_DimensionNameTypeCode codeList="#" codeListValue="column">column</gmd:MD_DimensionNameTypeCode></gmd:dimensionName>
      <gmd:dimensionSize><gco:Integer>256</gco:Integer></gmd:dimensionSize>
      <gmd:resolution><gco:Measure uom="m">20</gco:Measure></gmd:resolution>
    </gmd:MD_Dimension></gmd:axisDimensionProperties>
  </gmd:MD_GridSpatialRepresentation></gmd:spatialRepresentationInfo>
  <gmd:identificationInfo><gmd:MD_DataIdentification>
    <gmd:citation><gmd:CI_Citation>
      <gmd:title><gco:CharacterString>Snowpack depth grids</gco:CharacterString></gmd:title>
    </gmd:CI_Citation></gmd:citation>
    <gmd:abstract><gco:CharacterString>Modeled snow depth.</gco:CharacterString></gmd:abstract>
    <gmd:pointOfContact><gmd:CI_ResponsibleParty>
      <gmd:individualName><gco:CharacterString>Sam Ortiz</gco:CharacterString></gmd:individualName>
      <gmd:organisationName><gco:CharacterString>Snow Lab</gco:CharacterString></gmd:organisationName>
      <gmd:contactInfo><gmd:CI_Contact><gmd:address><gmd:CI_Address>
        <gmd:city><gco:CharacterString>Boulder</gco:CharacterString></gmd:city>
        <gmd:electronicMailAddress><gco:CharacterString>sortiz@example.org</gco:CharacterString></gmd:electronicMailAddress>
      </gmd:CI_Address></gmd:address></gmd:CI_Contact></gmd:contactInfo>
    </gmd:CI_ResponsibleParty></gmd:pointOfContact>
    <gmd:descriptiveKeywords><gmd:MD_Keywords>
      <gmd:keyword><gco:CharacterString>snow</gco:CharacterString></gmd:keyword>
      <gmd:type><gmd:MD_KeywordTypeCode codeList="#" codeListValue="theme">theme</gmd:MD_KeywordTypeCode></gmd:type>
    </gmd:MD_Keywords></gmd:descriptiveKeywords>
    <gmd:descriptiveKeywords><gmd:MD_Keywords>
      <gmd:keyword><gco:CharacterString>Rocky Mountains</gco:CharacterString></gmd:keyword>
      <gmd:type><gmd:MD_KeywordTypeCode codeList="#" codeListValue="place">place</gmd:MD_KeywordTypeCode></gmd:type>
    </gmd:MD_Keywords></gmd:descriptiveKeywords>
    <gmd:aggregationInfo><gmd:MD_AggregateInformation><gmd:aggregateDataSetName><gmd:CI_Citation>
      <gmd:title><gco:CharacterString>Western snow survey</gco:CharacterString></gmd:title>
      <gmd:date><gmd:CI_Date><gmd:date><gco:Date>2017-01-01</gco:Date></gmd:date></gmd:CI_Date></gmd:date>
      <gmd:citedResponsibleParty><gmd:CI_ResponsibleParty>
        <gmd:organisationName><gco:CharacterString>Snow Lab</gco:CharacterString></gmd:organisationName>
      </gmd:CI_ResponsibleParty></gmd:citedResponsibleParty>
    </gmd:CI_Citation></gmd:aggregateDataSetName></gmd:MD_AggregateInformation></gmd:aggregationInfo>
    <gmd:extent><gmd:EX_Extent>
      <gmd:geographicElement><gmd:EX_GeographicBoundingBox>
        <gmd:westBoundLongitude><gco:Decimal>-109.1</gco:Decimal></gmd:westBoundLongitude>
        <gmd:eastBoundLongitude><gco:Decimal>-102.0</gco:Decimal></gmd:eastBoundLongitude>
        <gmd:southBoundLatitude><gco:Decimal>37.0</gco:Decimal></gmd:southBoundLatitude>
        <gmd:northBoundLatitude><gco:Decimal>41.0</gco:Decimal></gmd:northBoundLatitude>
      </gmd:EX_GeographicBoundingBox></gmd:geographicElement>
      <gmd:temporalElement><gmd:EX_TemporalExtent><gmd:extent>
        <gml:TimePeriod gml:id="p1"><gml:beginPosition>2000-01-01</gml:beginPosition><gml:endPosition>2010-12-31</gml:endPosition></gml:TimePeriod>
      </gmd:extent></gmd:EX_TemporalExtent></gmd:temporalElement>
    </gmd:EX_Extent></gmd:extent>
  </gmd:MD_DataIdentification></gmd:identificationInfo>
  <gmd:distributionInfo><gmd:MD_Distribution>
    <gmd:distributionFormat><gmd:MD_Format>
      <gmd:name><gco:CharacterString>GeoTIFF</gco:CharacterString></gmd:name>
      <gmd:version><gco:CharacterString>1.0</gco:CharacterString></gmd:version>
    </gmd:MD_Format></gmd:distributionFormat>
    <gmd:transferOptions><gmd:MD_DigitalTransferOptions><gmd:onLine><gmd:CI_OnlineResource>
      <gmd:linkage><gmd:URL>https://example.org/snow.tif</gmd:URL></gmd:linkage>
      <gmd:description><gco:CharacterString>Direct download</gco:CharacterString></gmd:description>
    </gmd:CI_OnlineResource></gmd:onLine></gmd:MD_DigitalTransferOptions></gmd:transferOptions>
  </gmd:MD_Distribution></gmd:distributionInfo>
  <gmd:dataQualityInfo><gmd:DQ_DataQuality><gmd:lineage><gmd:LI_Lineage>
    <gmd:processStep><gmd:LI_ProcessStep>
      <gmd:description><gco:CharacterString>Interpolated station data.</gco:CharacterString></gmd:description>
      <gmd:dateTime><gco:DateTime>2011-03-01T00:00:00</gco:DateTime></gmd:dateTime>
      <gmd:source><gmd:LI_Source><gmd:description><gco:CharacterString>SNOTEL</gco:CharacterString></gmd:description></gmd:LI_Source></gmd:source>
    </gmd:LI_ProcessStep></gmd:processStep>
  </gmd:LI_Lineage></gmd:lineage></gmd:DQ_DataQuality></gmd:dataQualityInfo>
</gmi:MI_Metadata>"##;

    #[test]
    fn test_iso_summary() {
        let summary = summarize_xml_meta(RECORD).unwrap();
        assert_eq!(summary.title.as_deref(), Some("Snowpack depth grids"));
        assert_eq!(summary.abstract_text.as_deref(), Some("Modeled snow depth."));
        assert_eq!(summary.thematic_keywords, vec!["snow"]);
        assert_eq!(summary.place_keywords, vec!["Rocky Mountains"]);

        let bbox = summary.bounding_box.unwrap();
        assert_eq!(bbox.east.as_deref(), Some("-102.0"));
        assert_eq!(bbox.north.as_deref(), Some("41.0"));

        let dates = summary.dates.unwrap();
        assert_eq!(dates.date_type, DateType::Range);
        assert_eq!(dates.values, vec!["2000-01-01", "2010-12-31"]);

        let contact = &summary.contacts[0];
        assert_eq!(contact.name.as_deref(), Some("Sam Ortiz"));
        assert_eq!(contact.email.as_deref(), Some("sortiz@example.org"));

        let form = &summary.digital_forms[0];
        assert_eq!(form.name.as_deref(), Some("GeoTIFF"));
        assert_eq!(form.network_resource.as_deref(), Some("https://example.org/snow.tif"));
        assert_eq!(form.access_desc.as_deref(), Some("Direct download"));

        let larger = summary.larger_works.unwrap();
        assert_eq!(larger.title.as_deref(), Some("Western snow survey"));
        assert_eq!(larger.origin, vec!["Snow Lab"]);
        assert_eq!(larger.publish_date.as_deref(), Some("2017-01-01"));

        assert_eq!(summary.process_steps[0].sources, vec!["SNOTEL"]);
        assert_eq!(summary.process_steps[0].date.as_deref(), Some("2011-03-01T00:00:00"));

        let raster = summary.raster_info.unwrap();
        assert_eq!(raster.dimensions.as_deref(), Some("2"));
        assert_eq!(raster.row_count.as_deref(), Some("512"));
        assert_eq!(raster.column_count.as_deref(), Some("256"));
        assert_eq!(raster.x_resolution.as_deref(), Some("20"));
        assert_eq!(raster.y_resolution.as_deref(), Some("10"));
        assert!(summary.attributes.is_empty());
    }

    #[test]
    fn test_iso_instants_and_feature_attributes() {
        let xml = r##"<gmd:MD_Metadata xmlns:gmd="http://www.isotc211.org/2005/gmd" xmlns:gco="http://www.isotc211.org/2005/gco" xmlns:gml="http://www.opengis.net/gml/3.2" xmlns:gfc="http://www.isotc211.org/2005/gfc">
  <gmd:identificationInfo><gmd:MD_DataIdentification><gmd:extent><gmd:EX_Extent>
    <gmd:temporalElement><gmd:EX_TemporalExtent><gmd:extent><gml:TimeInstant><gml:timePosition>2015</gml:timePosition></gml:TimeInstant></gmd:extent></gmd:EX_TemporalExtent></gmd:temporalElement>
    <gmd:temporalElement><gmd:EX_TemporalExtent><gmd:extent><gml:TimeInstant><gml:timePosition>2016</gml:timePosition></gml:TimeInstant></gmd:extent></gmd:EX_TemporalExtent></gmd:temporalElement>
  </gmd:EX_Extent></gmd:extent></gmd:MD_DataIdentification></gmd:identificationInfo>
  <gmd:contentInfo><gfc:FC_FeatureCatalogue><gfc:featureType><gfc:FC_FeatureType><gfc:carrierOfCharacteristics>
    <gfc:FC_FeatureAttribute>
      <gfc:memberName><gco:LocalName>depth_cm</gco:LocalName></gfc:memberName>
      <gfc:definition><gco:CharacterString>Snow depth</gco:CharacterString></gfc:definition>
    </gfc:FC_FeatureAttribute>
  </gfc:carrierOfCharacteristics></gfc:FC_FeatureType></gfc:featureType></gfc:FC_FeatureCatalogue></gmd:contentInfo>
</gmd:MD_Metadata>"##;
        let summary = summarize_xml_meta(xml).unwrap();
        let dates = summary.dates.unwrap();
        assert_eq!(dates.date_type, DateType::Multiple);
        assert_eq!(dates.values, vec!["2015", "2016"]);
        assert_eq!(summary.attributes.len(), 1);
        assert_eq!(summary.attributes[0].label.as_deref(), Some("depth_cm"));
        assert_eq!(summary.attributes[0].definition.as_deref(), Some("Snow depth"));
        assert!(summary.raster_info.is_none());
    }
}
